// Terminal front end: tutor a single problem, or read problems off a photo.
use std::{
    io::{self, Write},
    sync::Arc,
};

use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Arg, Command};
use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use worksheet_tutor::config::Config;
use worksheet_tutor::question::build_question;
use worksheet_tutor::worksheet::scan_worksheet;
use worksheet_tutor::{Language, LearningState, Tutor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env()?;

    let matches = Command::new("tutor")
        .subcommand(Command::new("chat")
                        .aliases(["c"])
                        .about("Work through one problem step by step")
                        .arg(Arg::new("problem")
                                .short('p')
                                .long("problem")
                                .required(true)
                                .help("Problem text"))
                        .arg(Arg::new("lang")
                                .short('l')
                                .long("lang")
                                .default_value("ja")
                                .help("Reply language: ja or en")))
        .subcommand(Command::new("scan")
                        .aliases(["ocr", "s"])
                        .about("Read the problems on a worksheet photo")
                        .arg(Arg::new("image")
                                .required(true)
                                .help("Path to a PNG or JPEG")))
        .get_matches();

    match matches.subcommand() {
        Some(("chat", args)) => {
            let problem = args.get_one::<String>("problem").cloned().unwrap_or_default();
            let language = Language::from_code(args.get_one::<String>("lang").map(String::as_str));
            chat(&config, &problem, language).await?
        }
        Some(("scan", args)) => {
            let path = args.get_one::<String>("image").cloned().unwrap_or_default();
            scan(&config, &path).await?
        }
        _ => {
            eprintln!("Invalid command, use run tutor help");
        }
    }
    Ok(())
}

async fn chat(
    config: &Config,
    problem: &str,
    language: Language,
) -> Result<(), Box<dyn std::error::Error>> {
    // Without a key every reply is the plain core question.
    let tutor = match config.gemini() {
        Ok(gemini) => Tutor::new(Arc::new(gemini), config.style_timeout),
        Err(_) => Tutor::deterministic(),
    };

    let mut state = LearningState::initial();
    println!("tutor: {}", build_question(language, &state, problem, ""));

    loop {
        let mut message = String::new();
        if get_response("you", &mut message)? == 0 {
            break;
        }
        let message = message.trim();
        match message {
            "" => continue,
            "quit" | "exit" | "q" => break,
            _ => {}
        }

        let reply = tutor
            .next_turn(problem, message, language, Some(state))
            .await?;
        println!("tutor: {}", reply.text);
        state = reply.learning_state;
    }

    Ok(())
}

async fn scan(config: &Config, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let vision = config.vision()?;
    let gemini = config.gemini()?;

    let bytes = tokio::fs::read(path).await?;
    let result = scan_worksheet(&vision, &gemini, &STANDARD.encode(bytes)).await?;

    for (i, problem) in result.problems.iter().enumerate() {
        let marker = if i == result.primary_index { "*" } else { " " };
        println!("{} ({}) {}", marker, problem.number, problem.question);
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn get_response(question: &str, output: &mut String)
-> Result<usize, Box<dyn std::error::Error>> {
    print!("{}: ", question);
    io::stdout().flush()?;

    Ok(io::stdin().read_line(output)?)
}

use dibungo_markup::{collect_internal_links, parse_document, Head, InternalLink, MarkupError, ScriptRef};
use serde::Serialize;
use std::env;
use std::fs;
use std::process;
use thiserror::Error;

const TEMPLATES_BASE_PATH: &str = "/templates/";

#[derive(Error, Debug)]
enum CheckError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

#[derive(Serialize)]
struct Report {
    file: String,
    #[serde(flatten)]
    head: Head,
    has_main: bool,
    links: Vec<InternalLink>,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let files: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    if files.is_empty() {
        eprintln!("Usage: markup-check [--json] <file.html>...");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  markup-check templates/template1/index.html");
        eprintln!("  markup-check --json templates/*/*.html");
        process::exit(1);
    }

    let mut exit_code = 0;
    let mut reports = Vec::new();

    for file_path in files {
        match check_file(file_path) {
            Ok(report) if json => reports.push(report),
            Ok(report) => print_report(&report),
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    if json {
        match serde_json::to_string_pretty(&reports) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to encode report: {}", e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn check_file(path: &str) -> Result<Report, CheckError> {
    let content = fs::read_to_string(path)?;
    let doc = parse_document(&content)?;
    Ok(Report {
        file: path.to_string(),
        head: doc.head_summary(),
        has_main: doc.has_main_landmark(),
        links: collect_internal_links(&doc.body, TEMPLATES_BASE_PATH),
    })
}

fn print_report(report: &Report) {
    println!("✓ {}", report.file);
    println!("  title: {}", report.head.title.as_deref().unwrap_or("(none)"));
    for href in &report.head.stylesheets {
        println!("  css:   {}", href);
    }
    for script in &report.head.scripts {
        match script {
            ScriptRef::External { src } => println!("  js:    {}", src),
            ScriptRef::Inline { length } => println!("  js:    (inline, {} bytes)", length),
        }
    }
    if !report.has_main {
        println!("  note:  no <main> landmark, partial renders replace the whole body");
    }
    for link in &report.links {
        println!("  link:  {} -> {}", link.href, link.page);
    }
}

fn print_error(error: &CheckError) {
    let error = match error {
        CheckError::Io(e) => {
            eprintln!("  Failed to read file: {}", e);
            return;
        }
        CheckError::Markup(e) => e,
    };
    match error {
        MarkupError::ParseError {
            line,
            column,
            message,
        } => {
            eprintln!("  Parse error at line {}, column {}:", line, column);
            eprintln!("    {}", message);
        }
        MarkupError::EmptyDocument => {
            eprintln!("  Empty document: nothing to render");
        }
        MarkupError::MaxNestingDepthExceeded { max_depth } => {
            eprintln!("  Maximum nesting depth ({}) exceeded", max_depth);
            eprintln!("    Elements are nested too deeply");
        }
    }
}

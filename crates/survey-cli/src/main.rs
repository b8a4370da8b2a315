//! `surveyctl`: check and edit survey files from the command line

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use survey_editor::EditorConfig;

mod commands;
mod logging;

use logging::{init_logging, LogFormat};

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Survey file (.json document or .csurvey session)")
}

fn cli() -> Command {
    Command::new("surveyctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check and edit survey files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Editor configuration (TOML)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit log events as JSON"),
        )
        .subcommand(
            Command::new("check")
                .about("Report invalid references and expression issues")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("usages")
                .about("List usages of an item and its subtree")
                .arg(file_arg())
                .arg(Arg::new("key").required(true).help("Full key of the item")),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename an item and update every reference to it")
                .arg(file_arg())
                .arg(Arg::new("key").required(true).help("Full key of the item"))
                .arg(Arg::new("new-key").required(true).help("New local key"))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write here instead of overwriting the input"),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("Print the item tree")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("history")
                .about("Print the undo history of a session file")
                .arg(file_arg()),
        )
}

fn load_config(args: &ArgMatches) -> Result<EditorConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => Ok(survey_io::load_config(path)?),
        None => Ok(EditorConfig::default()),
    }
}

/// Run the selected subcommand; `Ok(false)` means findings were reported
fn run(matches: &ArgMatches) -> Result<bool> {
    let Some((name, args)) = matches.subcommand() else {
        bail!("no subcommand given");
    };
    let config = load_config(args)?;
    let path = args
        .get_one::<PathBuf>("file")
        .context("missing survey file")?;

    match name {
        "check" => {
            let (editor, _) = commands::open(path, config)?;
            let report = commands::check(&editor, args.get_flag("json"))?;
            print!("{}", report.output);
            Ok(report.clean)
        }
        "usages" => {
            let (editor, _) = commands::open(path, config)?;
            print!("{}", commands::usages(&editor, string_arg(args, "key")?)?);
            Ok(true)
        }
        "rename" => {
            let output = args.get_one::<PathBuf>("output").unwrap_or(path);
            let (mut editor, format) = commands::open(path, config)?;
            let message = commands::rename(
                &mut editor,
                format,
                string_arg(args, "key")?,
                string_arg(args, "new-key")?,
                output,
            )?;
            print!("{message}");
            Ok(true)
        }
        "tree" => {
            let (editor, _) = commands::open(path, config)?;
            print!("{}", commands::tree(editor.document()));
            Ok(true)
        }
        "history" => {
            let (editor, _) = commands::open(path, config)?;
            print!("{}", commands::history(&editor));
            Ok(true)
        }
        other => bail!("unknown subcommand '{other}'"),
    }
}

fn string_arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument '{name}'"))
}

fn log_format(matches: &ArgMatches) -> LogFormat {
    let json = matches.get_flag("log-json")
        || matches
            .subcommand()
            .is_some_and(|(_, args)| args.get_flag("log-json"));
    if json {
        LogFormat::Json
    } else {
        LogFormat::Text
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(log_format(&matches));

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_test_utils::e2e_document;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn check_fails_on_dangling_reference() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("survey.json");
        let mut doc = e2e_document();
        doc.remove_item("survey.G1.Q2").unwrap();
        survey_io::write_document(&path, &doc).unwrap();

        let matches = cli()
            .try_get_matches_from(["surveyctl", "check", path.to_str().unwrap()])
            .unwrap();
        assert!(!run(&matches).unwrap());
    }

    #[test]
    fn rename_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        survey_io::write_document(&input, &e2e_document()).unwrap();

        let matches = cli()
            .try_get_matches_from([
                "surveyctl",
                "rename",
                input.to_str().unwrap(),
                "survey.G1.Q2",
                "Q9",
                "--output",
                output.to_str().unwrap(),
            ])
            .unwrap();
        assert!(run(&matches).unwrap());

        let written = survey_io::read_survey(&output).unwrap();
        assert!(written.document().contains("survey.G1.Q9"));
        assert!(!written.document().contains("survey.G1.Q2"));
    }
}

//! regexcraft CLI entry point.
//!
//! Generate, test, refine and convert find/replace patterns from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regexcraft::application::assistant::PatternAssistant;
use regexcraft::application::files::{FileAction, FileOutcome, substituted_file_name};
use regexcraft::application::pattern::ReplaceMode;
use regexcraft::commands::{
    self, ConvertSyntaxRequest, ExampleInput, GenerateRequest, SubstituteTextRequest,
    TestFileRequest, TestTextRequest,
};
use regexcraft::domain::{ErrorResponse, MatchResult, PatternSpecification, TargetDialect};
use regexcraft::infra::agents::{OFFLINE_AGENT_ID, list_agent_candidates, resolve_agent};
use regexcraft::infra::app_config::{self, AppConfig};
use regexcraft::infra::completion::{AcpCompletion, CompletionProvider, ScriptedCompletion};
use regexcraft::infra::extract::UploadedFile;
use regexcraft::infra::rule_library::RuleLibrary;
use regexcraft::state::Workbench;

#[derive(Parser, Debug)]
#[command(name = "regexcraft")]
#[command(version)]
#[command(about = "AI-assisted find/replace pattern authoring", long_about = None)]
struct Args {
    /// Agent to use for completions (see `regexcraft agents`)
    #[arg(short, long, global = true)]
    agent: Option<String>,

    /// Replay canned responses instead of spawning an agent
    #[arg(long, global = true)]
    offline: bool,

    /// Canned responses for --offline, one per block separated by `---` lines
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: platform data dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the rule-dictionary tree
    #[arg(long, global = true)]
    rules_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct SpecArgs {
    /// What the pattern should match, in plain words
    #[arg(short, long)]
    description: String,

    /// Text that should match, optionally `text::note`
    #[arg(long = "example")]
    examples: Vec<String>,

    /// Text that must not match, optionally `text::note`
    #[arg(long = "not-example")]
    not_examples: Vec<String>,

    #[arg(long)]
    case_sensitive: bool,

    /// Require whole-word matches
    #[arg(long)]
    whole_word: bool,
}

#[derive(clap::Args, Debug, Clone)]
struct SubjectArgs {
    /// Subject text
    #[arg(long, conflicts_with = "stdin")]
    text: Option<String>,

    /// Read the subject from stdin
    #[arg(long)]
    stdin: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a find/replace pair from a description
    Generate {
        #[command(flatten)]
        spec: SpecArgs,
    },

    /// List matches of a pattern in some text
    Test {
        #[arg(short, long)]
        find: String,
        #[command(flatten)]
        subject: SubjectArgs,
        #[arg(long)]
        case_sensitive: bool,
        /// Attach context snippets of this radius
        #[arg(long)]
        context: Option<usize>,
    },

    /// Replace every match in some text
    Substitute {
        #[arg(short, long)]
        find: String,
        #[arg(short, long)]
        replace: String,
        #[command(flatten)]
        subject: SubjectArgs,
        #[arg(long)]
        case_sensitive: bool,
        /// Insert the replacement verbatim, without `$1` expansion
        #[arg(long)]
        literal: bool,
        /// Print a unified diff instead of the result
        #[arg(long)]
        diff: bool,
    },

    /// Test or substitute against a .txt or .docx file
    File {
        path: PathBuf,
        #[arg(short, long)]
        find: String,
        #[arg(short, long)]
        replace: Option<String>,
        #[arg(long)]
        substitute: bool,
        #[arg(long)]
        case_sensitive: bool,
        /// Where to write the substituted text (default: substituted_<name>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a pattern pair to another regex dialect
    Convert {
        #[arg(short, long)]
        find: String,
        #[arg(short, long)]
        replace: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// dotnet, pcre, python, javascript or java
        #[arg(long)]
        dialect: Option<TargetDialect>,
    },

    /// Browse the rule-dictionary library
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Interactive generate → test → refine loop
    Session {
        #[command(flatten)]
        spec: SpecArgs,
        /// Write the refinement log as markdown on exit
        #[arg(long)]
        transcript: Option<PathBuf>,
    },

    /// List known ACP agents
    Agents,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    Purposes,
    Languages {
        purpose: String,
    },
    Dictionaries {
        purpose: String,
        language: String,
    },
    Show {
        purpose: String,
        language: String,
        file: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => app_config::load_config_from(path),
        None => app_config::load_config(),
    };

    let level = if args.debug || config.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = run(args, config) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args, mut config: AppConfig) -> Result<()> {
    if let Some(agent) = &args.agent {
        config.agent = agent.clone();
    }
    config.debug |= args.debug;
    let out = Output { json: args.json };

    match args.command {
        Commands::Generate { spec } => {
            let assistant = build_assistant(args.offline, args.script.as_deref(), &config)?;
            let request = generate_request(&spec);
            let response = regexcraft::block_on(commands::generate(&assistant, request));
            out.emit(response, |r| {
                println!("Find:    {}", r.find_pattern);
                println!("Replace: {}", r.replace_pattern);
                println!();
                println!("{}", r.explanation);
            })
        }
        Commands::Test {
            find,
            subject,
            case_sensitive,
            context,
        } => {
            let request = TestTextRequest {
                find_pattern: find,
                subject: read_subject(&subject)?,
                case_sensitive,
                context_radius: context,
            };
            out.emit(commands::test_on_text(&request), |r| print_matches(&r.matches))
        }
        Commands::Substitute {
            find,
            replace,
            subject,
            case_sensitive,
            literal,
            diff,
        } => {
            let request = SubstituteTextRequest {
                find_pattern: find,
                replace_pattern: replace,
                subject: read_subject(&subject)?,
                case_sensitive,
                mode: if literal {
                    ReplaceMode::Literal
                } else {
                    ReplaceMode::Template
                },
            };
            let original = request.subject.clone();
            out.emit(commands::substitute_on_text(&request), |r| {
                if diff {
                    print!("{}", unified_diff(&original, &r.result));
                } else {
                    println!("{}", r.result);
                }
            })
        }
        Commands::File {
            path,
            find,
            replace,
            substitute,
            case_sensitive,
            output,
        } => {
            let file = UploadedFile::from_path(&path)?;
            let request = TestFileRequest {
                find_pattern: Some(find),
                replace_pattern: replace,
                case_sensitive,
                action: if substitute {
                    FileAction::Substitute
                } else {
                    FileAction::Test
                },
            };
            let outcome = commands::test_on_file(Some(&file), &request);
            if let Ok(FileOutcome::Substituted { result }) = &outcome {
                let target = output.unwrap_or_else(|| {
                    path.with_file_name(substituted_file_name(&file.name))
                });
                std::fs::write(&target, result)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                if !out.json {
                    println!("Wrote {}", target.display());
                    return Ok(());
                }
            }
            out.emit(outcome, |o| {
                if let FileOutcome::Matches { matches } = o {
                    print_matches(matches);
                }
            })
        }
        Commands::Convert {
            find,
            replace,
            description,
            dialect,
        } => {
            let assistant = build_assistant(args.offline, args.script.as_deref(), &config)?;
            let request = ConvertSyntaxRequest {
                find_pattern: find,
                replace_pattern: replace,
                description,
                dialect: dialect.unwrap_or(config.target_dialect),
            };
            let response = regexcraft::block_on(commands::convert_syntax(&assistant, request));
            out.emit(response, |r| {
                println!("{} find:    {}", r.dialect.label(), r.target_find);
                println!("{} replace: {}", r.dialect.label(), r.target_replace);
            })
        }
        Commands::Rules { command } => {
            let library = RuleLibrary::new(config.resolve_rules_root(args.rules_root.as_deref()));
            run_rules(&library, command, &out)
        }
        Commands::Session { spec, transcript } => {
            let assistant = build_assistant(args.offline, args.script.as_deref(), &config)?;
            let library = RuleLibrary::new(config.resolve_rules_root(args.rules_root.as_deref()));
            let mut bench = Workbench::from_config(&config);
            run_session(&mut bench, &assistant, &library, &specification(&spec), &config)?;
            if let Some(path) = transcript {
                std::fs::write(&path, bench.session().to_markdown())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            Ok(())
        }
        Commands::Agents => {
            let candidates = list_agent_candidates();
            if out.json {
                let rows: Vec<_> = candidates
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "id": c.id,
                            "label": c.label,
                            "command": c.command,
                            "args": c.args,
                            "available": c.available,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for c in candidates {
                    let mark = if c.available { "✓" } else { " " };
                    let marker = if c.id == config.agent { "*" } else { " " };
                    println!("{mark}{marker} {:<10} {}", c.id, c.label);
                }
            }
            Ok(())
        }
        Commands::Config {
            command: ConfigCommand::Init { force },
        } => {
            let path = args.config.clone().unwrap_or_else(app_config::config_path);
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force)", path.display());
            }
            app_config::save_config_to(&AppConfig::default(), &path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(
        &self,
        result: Result<T, ErrorResponse>,
        human: impl FnOnce(&T),
    ) -> Result<()> {
        match result {
            Ok(value) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                } else {
                    human(&value);
                }
                Ok(())
            }
            Err(err) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&err)?);
                }
                Err(err.into())
            }
        }
    }
}

fn build_assistant(
    offline: bool,
    script: Option<&Path>,
    config: &AppConfig,
) -> Result<PatternAssistant> {
    let provider: Arc<dyn CompletionProvider> = if offline || config.agent == OFFLINE_AGENT_ID {
        let scripted = ScriptedCompletion::new();
        if let Some(path) = script {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            for block in split_script(&contents) {
                scripted.push_ok(block);
            }
        }
        Arc::new(scripted)
    } else {
        Arc::new(AcpCompletion::new(resolve_agent(config)?))
    };
    Ok(PatternAssistant::new(provider))
}

fn split_script(contents: &str) -> Vec<String> {
    let mut blocks = vec![String::new()];
    for line in contents.lines() {
        if line.trim() == "---" {
            blocks.push(String::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push_str(line);
            block.push('\n');
        }
    }
    blocks
        .into_iter()
        .map(|block| block.trim().to_string())
        .filter(|block| !block.is_empty())
        .collect()
}

fn parse_example(raw: &str) -> ExampleInput {
    match raw.split_once("::") {
        Some((text, note)) => ExampleInput::Pair(text.to_string(), note.to_string()),
        None => ExampleInput::Text(raw.to_string()),
    }
}

fn generate_request(spec: &SpecArgs) -> GenerateRequest {
    GenerateRequest {
        description: spec.description.clone(),
        examples: spec.examples.iter().map(|e| parse_example(e)).collect(),
        not_examples: spec.not_examples.iter().map(|e| parse_example(e)).collect(),
        case_sensitive: spec.case_sensitive,
        part_of_word: !spec.whole_word,
    }
}

fn specification(spec: &SpecArgs) -> PatternSpecification {
    generate_request(spec).into_specification()
}

fn read_subject(subject: &SubjectArgs) -> Result<String> {
    if let Some(text) = &subject.text {
        return Ok(text.clone());
    }
    if !subject.stdin {
        anyhow::bail!("provide --text or --stdin");
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}

fn print_matches(matches: &[MatchResult]) {
    if matches.is_empty() {
        println!("No matches.");
        return;
    }
    for (idx, m) in matches.iter().enumerate() {
        println!("{:>3}. [{}..{}] {:?}", idx + 1, m.start, m.end, m.matched);
        for (group, value) in m.groups.iter().enumerate() {
            if let Some(value) = value {
                println!("       ${} = {value:?}", group + 1);
            }
        }
        if let Some(context) = &m.context {
            println!("       {}", context.replace('\n', " "));
        }
    }
}

fn unified_diff(original: &str, substituted: &str) -> String {
    similar::TextDiff::from_lines(original, substituted)
        .unified_diff()
        .context_radius(3)
        .header("original", "substituted")
        .to_string()
}

fn run_rules(library: &RuleLibrary, command: RulesCommand, out: &Output) -> Result<()> {
    let names = match command {
        RulesCommand::Purposes => library.list_purposes(),
        RulesCommand::Languages { purpose } => library.list_languages(&purpose)?,
        RulesCommand::Dictionaries { purpose, language } => {
            library.list_dictionaries(&purpose, &language)?
        }
        RulesCommand::Show {
            purpose,
            language,
            file,
        } => {
            let dictionary = library.load_dictionary(&purpose, &language, &file)?;
            if out.json {
                println!("{}", serde_json::to_string_pretty(&dictionary)?);
            } else {
                println!("{} ({} rules)", dictionary.name, dictionary.rules.len());
                for rule in &dictionary.rules {
                    let state = if rule.active { "on " } else { "off" };
                    println!("  [{state}] {:<8} {}", rule.id, rule.description);
                    println!("        find:    {}", rule.find);
                    println!("        replace: {}", rule.replace);
                }
            }
            return Ok(());
        }
    };

    if out.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

const SESSION_HELP: &str = "\
:test <text>      list matches of the current find pattern
:sub <text>       substitute with the current pair
:find <pattern>   edit the find pattern
:replace <tmpl>   edit the replace template
:convert [dialect] convert the current pair
:rule <purpose> <language> <file> <id>  load a dictionary rule
:clear            clear the refinement log
:log              show the refinement log
:quit             leave
anything else     refinement feedback";

fn print_draft(bench: &Workbench) {
    if let Some(draft) = bench.draft() {
        println!("Find:    {}", draft.edited().find);
        println!("Replace: {}", draft.edited().replace);
        println!();
        println!("{}", draft.explanation());
    }
}

fn run_session(
    bench: &mut Workbench,
    assistant: &PatternAssistant,
    library: &RuleLibrary,
    spec: &PatternSpecification,
    config: &AppConfig,
) -> Result<()> {
    match regexcraft::block_on(bench.generate(assistant, spec.clone())) {
        Ok(_) => print_draft(bench),
        Err(err) => eprintln!("Error: {err}"),
    }
    println!("{SESSION_HELP}");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) if command.starts_with(':') => (command, rest.trim()),
            _ if line.starts_with(':') => (line, ""),
            _ => ("", line),
        };

        let result: Result<(), regexcraft::domain::AssistError> = match command {
            ":quit" | ":q" => break,
            ":test" => bench.test_on_text(rest, true).map(|m| print_matches(&m)),
            ":sub" => bench
                .substitute_on_text(rest, ReplaceMode::Template)
                .map(|r| println!("{r}")),
            ":find" => bench.edit_find(rest),
            ":replace" => bench.edit_replace(rest),
            ":convert" => {
                let dialect = if rest.is_empty() {
                    config.target_dialect
                } else {
                    match rest.parse::<TargetDialect>() {
                        Ok(dialect) => dialect,
                        Err(err) => {
                            eprintln!("{err}");
                            continue;
                        }
                    }
                };
                regexcraft::block_on(bench.convert(assistant, dialect)).map(|_| {
                    if let Some(converted) = bench.converted() {
                        let label = converted.dialect.label();
                        println!("{label} find:    {}", converted.target_find);
                        println!("{label} replace: {}", converted.target_replace);
                    }
                })
            }
            ":rule" => {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                let [purpose, language, file, id] = parts.as_slice() else {
                    eprintln!("usage: :rule <purpose> <language> <file> <id>");
                    continue;
                };
                match library.load_dictionary(purpose, language, file) {
                    Ok(dictionary) => match dictionary.find_rule(id) {
                        Some(rule) => {
                            bench.load_rule(rule);
                            print_draft(bench);
                        }
                        None => eprintln!("no rule {id} in {}", dictionary.name),
                    },
                    Err(err) => eprintln!("Error: {err}"),
                }
                Ok(())
            }
            ":clear" => {
                bench.clear_session();
                Ok(())
            }
            ":log" => {
                println!("{}", bench.session().to_markdown());
                Ok(())
            }
            ":help" => {
                println!("{SESSION_HELP}");
                Ok(())
            }
            "" => regexcraft::block_on(bench.refine(assistant, rest)).map(|_| {
                if let Some(turn) = bench.session().last() {
                    println!("{}", turn.content);
                }
                print_draft(bench);
            }),
            other => {
                eprintln!("unknown command {other} (try :help)");
                Ok(())
            }
        };

        if let Err(err) = result {
            eprintln!("Error: {err}");
            if let Some(turn) = bench.session().last()
                && command.is_empty()
            {
                println!("{}", turn.content);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regexcraft::domain::{ExamplePair, PatternOptions};

    #[test]
    fn test_parse_example_note() {
        assert_eq!(
            ExamplePair::from(parse_example("I have 42::the number")),
            ExamplePair::with_note("I have 42", "the number")
        );
        assert_eq!(
            ExamplePair::from(parse_example("plain")),
            ExamplePair::new("plain")
        );
    }

    #[test]
    fn test_split_script_blocks() {
        let blocks = split_script("a|||b\n---\nexplain\nmore\n---\n\n");
        assert_eq!(blocks, vec!["a|||b".to_string(), "explain\nmore".to_string()]);
    }

    #[test]
    fn test_specification_from_args() {
        let spec = specification(&SpecArgs {
            description: "cats".into(),
            examples: vec!["cat".into()],
            not_examples: vec![],
            case_sensitive: true,
            whole_word: true,
        });
        assert_eq!(
            spec.options,
            PatternOptions {
                case_sensitive: true,
                part_of_word: false
            }
        );
    }

    #[test]
    fn test_unified_diff_marks_changes() {
        let diff = unified_diff("a 1\nb\n", "a #\nb\n");
        assert!(diff.contains("-a 1"));
        assert!(diff.contains("+a #"));
    }

    #[test]
    fn test_cli_parses() {
        let args = Args::try_parse_from([
            "regexcraft",
            "--offline",
            "substitute",
            "-f",
            "x",
            "-r",
            "y",
            "--text",
            "xx",
        ])
        .unwrap();
        assert!(args.offline);
        assert!(matches!(args.command, Commands::Substitute { .. }));
    }
}

use super::*;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_clone_defaults() {
    match parse(&["pagemirror", "clone", "https://example.com/"]) {
        CliCommand::Clone {
            url,
            output,
            timeout,
            user_agent,
        } => {
            assert_eq!(url, "https://example.com/");
            assert_eq!(output, PathBuf::from("cloned_website"));
            assert!(timeout.is_none());
            assert!(user_agent.is_none());
        }
        _ => panic!("expected Clone"),
    }
}

#[test]
fn cli_parse_clone_with_options() {
    match parse(&[
        "pagemirror",
        "clone",
        "https://example.com/a.html",
        "-o",
        "/tmp/mirror",
        "--timeout",
        "5",
        "--user-agent",
        "test-agent",
    ]) {
        CliCommand::Clone {
            url,
            output,
            timeout,
            user_agent,
        } => {
            assert_eq!(url, "https://example.com/a.html");
            assert_eq!(output, PathBuf::from("/tmp/mirror"));
            assert_eq!(timeout, Some(5));
            assert_eq!(user_agent.as_deref(), Some("test-agent"));
        }
        _ => panic!("expected Clone"),
    }
}

#[test]
fn cli_parse_clone_requires_url() {
    assert!(Cli::try_parse_from(["pagemirror", "clone"]).is_err());
}

#[test]
fn cli_parse_config() {
    match parse(&["pagemirror", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["pagemirror", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn overrides_replace_config_values() {
    let mut cfg = MirrorConfig::default();
    apply_overrides(&mut cfg, Some(3), Some("ua/1".to_string()));
    assert_eq!(cfg.request_timeout_secs, 3);
    assert_eq!(cfg.user_agent, "ua/1");

    let mut untouched = MirrorConfig::default();
    apply_overrides(&mut untouched, None, None);
    assert_eq!(untouched, MirrorConfig::default());
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

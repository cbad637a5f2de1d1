use super::*;
use crate::core::EnvSelection;
use crate::generator::CapabilityType;

#[test]
fn test_install_parsing() {
    let cli = Cli::try_parse_from([
        "vibe-plugins",
        "install",
        "cross-platform",
        "--target",
        "../app",
        "--env",
        "qoder",
        "--dry-run",
    ])
    .unwrap();

    let Commands::Install(cmd) = cli.command else {
        panic!("expected install");
    };
    assert_eq!(cmd.plugin, "cross-platform");
    assert_eq!(cmd.target.as_deref(), Some("../app"));
    assert_eq!(cmd.env, EnvSelection::Qoder);
    assert!(cmd.dry_run);
    assert!(!cmd.use_sdk);
}

#[test]
fn test_install_defaults_and_alias() {
    let cli = Cli::try_parse_from(["vibe-plugins", "add", "demo"]).unwrap();
    let Commands::Install(cmd) = cli.command else {
        panic!("expected install");
    };
    assert_eq!(cmd.env, EnvSelection::Auto);
    assert!(cmd.target.is_none());
}

#[test]
fn test_invalid_env_rejected() {
    assert!(Cli::try_parse_from(["vibe-plugins", "install", "demo", "--env", "vscode"]).is_err());
}

#[test]
fn test_generate_aliases() {
    for alias in ["generate", "gen", "new"] {
        let cli = Cli::try_parse_from([
            "vibe-plugins",
            alias,
            "-n",
            "lint",
            "-d",
            "Lint",
            "-t",
            "command",
            "-c",
            "stability",
        ])
        .unwrap();
        let Commands::Generate(cmd) = cli.command else {
            panic!("expected generate for {alias}");
        };
        assert_eq!(cmd.kind.parse::<CapabilityType>().unwrap(), CapabilityType::SlashCommand);
        assert_eq!(cmd.category, "stability");
    }
}

#[test]
fn test_generate_requires_fields() {
    assert!(Cli::try_parse_from(["vibe-plugins", "generate", "-n", "lint"]).is_err());
}

#[test]
fn test_global_flags() {
    let cli = Cli::try_parse_from([
        "vibe-plugins",
        "gen-batch",
        "items.json",
        "--plugins-root",
        "/srv/plugins",
        "--verbose",
    ])
    .unwrap();
    assert!(cli.is_verbose());
    assert_eq!(cli.global_options().plugins_root, Some(PathBuf::from("/srv/plugins")));
    assert!(matches!(cli.command, Commands::GenerateBatch(_)));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["vibe-plugins", "list-types", "-v", "-q"]).is_err());
}

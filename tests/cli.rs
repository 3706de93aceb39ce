//! Integration tests for argument parsing and the option command handlers

use clap::Parser;
use serde_json::json;
use site_options::cli::commands::{OptionSubcommands, ValueArgs};
use site_options::cli::{Cli, Commands};
use site_options::commands::option;
use site_options::config::Config;

fn value_args(key: &str, value: &str) -> ValueArgs {
    ValueArgs {
        key: key.to_string(),
        value: value.to_string(),
        args: Vec::new(),
        json: false,
        eval: false,
        execute: false,
        no_autoload: false,
    }
}

#[test]
fn test_parse_add_with_global_flags() {
    let cli = Cli::try_parse_from([
        "site-options",
        "--scope",
        "3",
        "option",
        "add",
        "--json",
        "--no-autoload",
        "limits",
        "{\"per_page\": 10}",
    ])
    .unwrap();

    assert_eq!(cli.scope, Some(3));
    let Commands::Option(cmd) = cli.command else {
        panic!("expected option command");
    };
    let OptionSubcommands::Add(args) = cmd.command else {
        panic!("expected add");
    };
    assert_eq!(args.key, "limits");
    assert!(args.json);
    assert!(args.no_autoload);
}

#[test]
fn test_value_modes_are_exclusive() {
    let result = Cli::try_parse_from(["site-options", "option", "add", "--json", "--eval", "k", "1"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_list_defaults() {
    let cli = Cli::try_parse_from(["site-options", "option", "list"]).unwrap();
    let Commands::Option(cmd) = cli.command else {
        panic!("expected option command");
    };
    match cmd.command {
        OptionSubcommands::List { page, per_page, order } => {
            assert_eq!(page, 1);
            assert_eq!(per_page, 25);
            assert_eq!(order, "pk");
        }
        _ => panic!("expected list"),
    }
}

#[tokio::test]
async fn test_option_commands() {
    let config = Config::new_test().await.unwrap();

    let mut args = value_args("limits", "{\"per_page\": 10}");
    args.json = true;
    option::add_command(&config, args.clone()).await.unwrap();
    assert!(option::add_command(&config, args.clone()).await.is_err());
    // Same value again: nothing to update.
    assert!(option::update_command(&config, args).await.is_err());

    let mut args = value_args("flags", "[True, None, 'on']");
    args.eval = true;
    option::update_command(&config, args).await.unwrap();

    option::update_command(&config, value_args("title", "Home")).await.unwrap();
    option::get_command(&config, "title".to_string()).await.unwrap();
    option::list_command(&config, 1, 2, "-key".to_string()).await.unwrap();
    assert!(option::list_command(&config, 1, 2, "value".to_string()).await.is_err());

    let mut options = config.manager(None);
    assert_eq!(options.get("limits").await.unwrap(), Some(json!({"per_page": 10})));
    assert_eq!(options.get("flags").await.unwrap(), Some(json!([true, null, "on"])));
    assert_eq!(options.get("title").await.unwrap(), Some(json!("Home")));

    option::delete_command(&config, "title".to_string(), true).await.unwrap();
    assert!(option::delete_command(&config, "title".to_string(), true).await.is_err());
    assert!(option::get_command(&config, "title".to_string()).await.is_err());
}

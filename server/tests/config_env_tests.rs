// booknest/server/tests/config_env_tests.rs

use booknest_server::config::AppConfig;
use serial_test::serial;
use std::env;

const VARS: [&str; 7] = [
  "SERVER_HOST",
  "SERVER_PORT",
  "DATABASE_URL",
  "TOKEN_SECRET",
  "TOKEN_TTL_HOURS",
  "RESTOCK_ON_CANCEL",
  "SEED_DB",
];

fn clear_vars() {
  for var in VARS {
    env::remove_var(var);
  }
}

#[test]
#[serial]
fn from_env_reads_process_environment() {
  clear_vars();
  env::set_var("TOKEN_SECRET", "env-test-secret-env-test-secret-env");
  env::set_var("SERVER_PORT", "9090");
  env::set_var("RESTOCK_ON_CANCEL", "true");

  let config = AppConfig::from_env().expect("environment is valid");
  assert_eq!(config.server_port, 9090);
  assert!(config.restock_on_cancel);
  assert!(config.settings().restock_on_cancel);
  clear_vars();
}

#[test]
#[serial]
fn from_env_requires_a_secret() {
  clear_vars();
  assert!(AppConfig::from_env().is_err());
}

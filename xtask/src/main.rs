// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Kermesse workspace automation
//!
//! Wraps the cargo invocations used locally and in CI:
//!
//! - `cargo xtask ci` runs lint, build, test and the migration check
//! - `cargo xtask test-concurrency` runs only the file-backed race tests
//! - `cargo xtask verify-migrations` applies and reverts the `SQLite`
//!   schema in memory and checks the constraints the ledger relies on
//!
//! No command here needs external infrastructure. The database is always
//! an in-memory `SQLite` connection.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::{io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the persistence layer reads and writes.
const EXPECTED_TABLES: [&str; 9] = [
    "kermesses",
    "kermesses_stands",
    "kermesses_users",
    "participations",
    "payment_top_ups",
    "stands",
    "tickets",
    "tombolas",
    "users",
];

/// Single-column unique indexes the handlers map to `Conflict` or depend on
/// for draw integrity.
const REQUIRED_UNIQUE: [(&str, &str); 4] = [
    ("users", "email"),
    ("stands", "holder_id"),
    ("payment_top_ups", "reference"),
    ("tickets", "tombola_id"),
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the workspace
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the workspace
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run all tests
    #[command(visible_alias = "t")]
    Test,

    /// Run the file-backed concurrency tests on their own
    #[command(visible_alias = "tc")]
    TestConcurrency,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Apply and revert the schema and check ledger constraints
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Deny => deny(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestConcurrency => test_concurrency(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

fn ci() -> Result<()> {
    lint()?;
    build()?;
    verify_migrations()?;
    test()?;
    Ok(())
}

fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

/// Lint formatting, typos, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    if let Err(err) = lint_typos() {
        tracing::warn!("typos-cli unavailable or reported issues: {err}");
    }
    Ok(())
}

fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Build docs for every default workspace package with warnings denied
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

fn test() -> Result<()> {
    test_libs()?;
    test_docs()?;
    Ok(())
}

/// The race tests open a temporary file database per test and are the
/// slowest part of the suite.
fn test_concurrency() -> Result<()> {
    run_cargo(vec![
        "test",
        "--package",
        "kermesse-api",
        "concurrency_tests",
    ])
}

fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Introspected view of a table: its foreign key targets and the column
/// sets covered by unique indexes (including partial ones).
#[derive(Debug, Default)]
struct TableShape {
    foreign_keys: BTreeSet<(String, String, String)>,
    unique_columns: BTreeSet<Vec<String>>,
}

/// Apply every migration to a fresh in-memory database, check the shape
/// the ledger depends on, then revert and check nothing is left behind.
///
/// # Errors
///
/// Returns an error if:
/// - A migration fails to apply or revert
/// - A table the persistence layer uses is missing
/// - A foreign key points at an unknown table
/// - A required unique index is missing
/// - Tables remain after reverting
fn verify_migrations() -> Result<()> {
    tracing::info!("Applying migrations to an in-memory database");
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("failed to open in-memory SQLite database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("failed to enable foreign keys")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to apply migrations: {e}"))?;
    tracing::info!("Applied {} migration(s)", applied.len());

    let schema = introspect_schema(&mut conn)?;
    check_schema(&schema)?;

    tracing::info!("Reverting migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("failed to revert migrations: {e}"))?;
    let leftover = table_names(&mut conn)?;
    if !leftover.is_empty() {
        return Err(eyre!("tables left after revert: {leftover:?}"));
    }

    tracing::info!("Migration check passed");
    Ok(())
}

fn check_schema(schema: &BTreeMap<String, TableShape>) -> Result<()> {
    for table in EXPECTED_TABLES {
        if !schema.contains_key(table) {
            return Err(eyre!("missing table '{table}'"));
        }
    }

    for (table, shape) in schema {
        for (target, from, to) in &shape.foreign_keys {
            if !schema.contains_key(target) {
                return Err(eyre!(
                    "foreign key {table}.{from} references unknown table {target}.{to}"
                ));
            }
        }
    }

    for (table, column) in REQUIRED_UNIQUE {
        let covered = schema
            .get(table)
            .is_some_and(|shape| shape.unique_columns.contains(&vec![column.to_string()]));
        if !covered {
            return Err(eyre!("missing unique index on {table}.{column}"));
        }
    }

    Ok(())
}

fn table_names(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let rows: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type = 'table' \
         AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("failed to list tables")?;

    Ok(rows.into_iter().map(|row| row.name).collect())
}

fn introspect_schema(conn: &mut SqliteConnection) -> Result<BTreeMap<String, TableShape>> {
    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        unique: i32,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = BTreeMap::new();

    for table in table_names(conn)? {
        let mut shape = TableShape::default();

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({table})"))
                .load(conn)
                .wrap_err(format!("failed to get foreign keys for {table}"))?;
        for fk in fks {
            shape.foreign_keys.insert((fk.table, fk.from, fk.to));
        }

        let indexes: Vec<IndexInfo> = diesel::sql_query(format!("PRAGMA index_list({table})"))
            .load(conn)
            .wrap_err(format!("failed to get indexes for {table}"))?;
        for index in indexes.into_iter().filter(|index| index.unique == 1) {
            let columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", index.name))
                    .load(conn)
                    .wrap_err(format!("failed to get columns for index {}", index.name))?;
            shape
                .unique_columns
                .insert(columns.into_iter().map(|c| c.name).collect());
        }

        tracing::debug!(
            "{table}: {} foreign key(s), {} unique index(es)",
            shape.foreign_keys.len(),
            shape.unique_columns.len()
        );
        schema.insert(table, shape);
    }

    Ok(schema)
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}

//! Walk through the fluent API against a small `user` table.
//!
//! ```text
//! cargo run --example user_table -- --db dbfile.db
//! RUST_LOG=sql_fluent=trace cargo run --example user_table
//! ```

use clap::Parser;
use sql_fluent::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Create, fill and query a user table through sql-fluent")]
struct Args {
    /// Database file; created when missing.
    #[arg(long, default_value = "dbfile.db")]
    db: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SqlFluentError> {
    let db = Database::builder(args.db.clone()).open()?;

    db.execute(
        "create table if not exists user (
            age int,
            name text,
            weight real
        );",
    )?;

    // Parameters bind to the `?` placeholders in append order. Text can be UTF-8 or UTF-16.
    db.statement("insert into user (age,name,weight) values (?,?,?);")?
        .bind(20)?
        .bind(Utf16String::from("bob"))?
        .bind(83.25f32)?
        .execute()?;

    // The SQL itself may be UTF-16 as well. Dropping an unextracted binder still runs it.
    db.statement(Utf16String::from(
        "insert into user (age,name,weight) values (?,?,?);",
    ))?
    .bind(21)?
    .bind("jack")?
    .bind(68.5)?;

    // One closure call per row; the argument types pick the column types.
    db.statement("select age,name,weight from user where age > ? ;")?
        .bind(18)?
        .for_each(|age: i32, name: String, weight: f64| {
            println!("{age} {name} {weight}");
        })?;

    let count: i32 = db.statement("select count(*) from user")?.extract()?;
    println!("count : {count}");

    // The same column read as text.
    let str_count: String = db.statement("select count(*) from user")?.extract()?;
    println!("scount : {str_count}");

    Ok(())
}

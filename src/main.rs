use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cat_file;
mod codec;
mod commit;
mod config;
mod error;
mod hash;
mod hash_object;
mod k;
mod kvlm;
mod object;
mod refs;
mod repo;
mod tag;
mod tree;
mod worktree;

#[derive(Parser, Debug)]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Initialize a new repository.
    Init {
        #[clap(default_value = ".")]
        path: PathBuf,
    },
    /// Hash (and optionally store) a file.
    HashObject {
        #[clap(short = 't', default_value = "blob")]
        kind: String,
        #[clap(short = 'w')]
        write: bool,
        file: PathBuf,
    },
    /// Print the raw payload of an object.
    CatFile { kind: String, oid: String },
    /// Snapshot the current directory into a tree object.
    WriteTree,
    /// Overwrite the worktree with the contents of a tree.
    ReadTree { oid: String },
    /// Snapshot the worktree and record a commit.
    Commit {
        #[clap(short = 'm')]
        message: String,
    },
    /// Walk the first-parent chain starting at OID (default `@`).
    Log {
        #[clap(default_value = "@")]
        oid: String,
    },
    /// Restore the worktree to a prior commit and move HEAD there.
    Checkout { oid: String },
    /// Create a lightweight tag.
    Tag {
        name: String,
        #[clap(default_value = "@")]
        oid: String,
    },
    /// Visualize refs and reachable commits.
    K,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match args.command {
        Command::Init { path } => {
            let repository = repo::init(&path).context("initializing repository")?;
            let absolute = std::fs::canonicalize(&repository.gitdir)
                .context("resolving absolute repository path")?;
            println!("Initialized empty repository in {}", absolute.display());
        }
        Command::HashObject { kind, write, file } => {
            let repository = if write {
                Some(repo::find(&std::path::PathBuf::from(".")).context("finding repository")?)
            } else {
                None
            };
            let oid = hash_object::git_hash_object(repository.as_ref(), &kind, &file)?;
            println!("{oid}");
        }
        Command::CatFile { kind, oid } => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            let oid = refs::find_object(&repository, &oid)?;
            cat_file::git_cat_file(&repository, &kind, &oid)?;
        }
        Command::WriteTree => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            let oid = worktree::write_tree(&repository, &repository.worktree)?;
            println!("{oid}");
        }
        Command::ReadTree { oid } => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            let oid = refs::find_object(&repository, &oid)?;
            worktree::read_tree(&repository, &oid)?;
        }
        Command::Commit { message } => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            let oid = commit::commit(&repository, &message)?;
            println!("{oid}");
        }
        Command::Log { oid } => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            let start = refs::find_object(&repository, &oid)?;
            for entry in commit::log(&repository, &start)? {
                let marker = if entry.is_head { " (HEAD)" } else { "" };
                println!("commit {}{marker}", entry.oid);
                for line in entry.message.lines() {
                    println!("    {line}");
                }
            }
        }
        Command::Checkout { oid } => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            let oid = refs::find_object(&repository, &oid)?;
            commit::checkout(&repository, &oid)?;
        }
        Command::Tag { name, oid } => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            tag::git_tag(&repository, &name, &oid)?;
        }
        Command::K => {
            let repository = repo::find(&PathBuf::from(".")).context("finding repository")?;
            print!("{}", k::git_k(&repository)?);
        }
    }
    Ok(())
}


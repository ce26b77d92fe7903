use crate::ruleset::{Assignment, Relation};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chunked_loop")]
#[command(about = "Run bulk workloads in bounded chunks with ordered results")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub options: CommonOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct CommonOptions {
    /// Maximum number of units of work in flight per chunk
    #[arg(short = 'p', long, global = true)]
    pub partition_size: Option<usize>,

    /// Dedicated worker thread count for the synchronous engine
    #[arg(short = 't', long, global = true)]
    pub threads: Option<usize>,

    /// JSON file with workload options
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results and run summary as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Square every value produced by a numeric loop ruleset
    Indexed(IndexedArgs),

    /// Count words on every line of a file, streamed one line at a time
    Lines {
        /// Text file to read
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct IndexedArgs {
    /// Initial value of the loop variable
    #[arg(long, allow_hyphen_values = true)]
    pub from: i64,

    /// Bound the loop variable is compared against
    #[arg(long, allow_hyphen_values = true)]
    pub to: i64,

    /// Continuation test applied before every iteration
    #[arg(short, long, value_enum, default_value = "lt")]
    pub relation: RelationArg,

    /// Operator used to advance the loop variable
    #[arg(short, long, value_enum, default_value = "add")]
    pub assignment: AssignmentArg,

    /// Step value
    #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
    pub step: i64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationArg {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl From<RelationArg> for Relation {
    fn from(value: RelationArg) -> Self {
        match value {
            RelationArg::Eq => Relation::Equal,
            RelationArg::Ne => Relation::NotEqual,
            RelationArg::Gt => Relation::GreaterThan,
            RelationArg::Ge => Relation::GreaterOrEqual,
            RelationArg::Lt => Relation::LessThan,
            RelationArg::Le => Relation::LessOrEqual,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentArg {
    Add,
    Sub,
    Mul,
    Div,
}

impl From<AssignmentArg> for Assignment {
    fn from(value: AssignmentArg) -> Self {
        match value {
            AssignmentArg::Add => Assignment::Add,
            AssignmentArg::Sub => Assignment::Subtract,
            AssignmentArg::Mul => Assignment::Multiply,
            AssignmentArg::Div => Assignment::Divide,
        }
    }
}

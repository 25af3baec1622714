use clap::Parser;
use cli::{Args, RunCmd};

#[derive(Parser, Debug)]
#[clap(name = "journal", version, about = "Render journal entries to sanitized HTML")]
struct Journal {
    #[clap(flatten)]
    args: Args,

    #[clap(subcommand)]
    command: RunCmd,
}

fn main() -> anyhow::Result<()> {
    let Journal { args, command } = Journal::parse();
    command.run(args)
}

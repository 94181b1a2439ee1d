use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = remove_ieds::cli::Cli::parse();
    remove_ieds::cli::run(cli)
}

mod command;
mod report;

fn main() -> anyhow::Result<()> {
    command::run()
}

mod command;
mod logger;
mod record;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}

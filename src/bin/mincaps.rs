use anyhow::Result;

fn main() -> Result<()> {
    mincaps::cli::run()
}

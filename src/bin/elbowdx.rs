use elbowdx::cli::{get_config, run};
use elbowdx::Result;

fn main() -> Result<()> {
    run(get_config()?)
}

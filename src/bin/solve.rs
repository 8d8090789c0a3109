use anyhow::{Context, Result};
use clap::Parser;
use maze_astar::{CLIArgs, Error};

fn main() -> Result<()> {
    let args = CLIArgs::parse();
    let grid = maze_astar::read_grid(&args.input_path).with_context(|| {
        format!(
            "Failed to read grid from given file({}).",
            args.input_path.display()
        )
    })?;

    match grid.endpoints() {
        Ok((start, goal)) => match grid.shortest_path(&start, &goal) {
            Some(path) => {
                for row in grid.render_path(&path) {
                    println!("{}", row);
                }
            }
            None => println!("failed"),
        },
        Err(Error::MarkerNotFound(_)) => println!("failed"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

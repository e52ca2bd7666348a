use matcalc::{IdGenerator, Matrix, NameGenerator, Workspace};
use std::io::{BufRead, BufReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut ids = IdGenerator::new();
    let mut names = NameGenerator::new();
    let mut workspace = Workspace::new();

    let seeds = vec![
        Matrix::from([[1.0, 0.0], [0.0, 1.0]]),
        Matrix::from([[1.0, 2.0], [3.0, 4.0]]),
        Matrix::from([[0.0, 1.0], [1.0, 0.0]]),
    ];

    for seed in seeds {
        let matrix = seed
            .with_id(ids.next_id())
            .with_name(names.next_name());

        println!("[{}] {}:", matrix.id(), matrix.name());
        println!("{}", matrix);

        workspace.add(matrix);
    }

    println!("Enter an expression, e.g. \"[1] + [2] * [3]\"");

    let stdin = std::io::stdin();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;

        if line.trim().is_empty() {
            continue;
        }

        match workspace.resolve(&line) {
            Ok(result) => println!("{}", result),
            Err(e) => eprintln!("Unable to evaluate \"{}\": {}", line, e),
        }
    }

    Ok(())
}

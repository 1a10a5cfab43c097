use eurofolio_lib::{replay, write_dividends_csv, write_shares_csv, Command, RateTable};
use eyre::{Context, Result};
use glob::glob;
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};

#[derive(Deserialize)]
struct TestCase {
    rates: serde_json::Value,
    commands: Vec<Command>,
}

fn expected(input: &Path, suffix: &str) -> Result<String> {
    let name = input
        .to_string_lossy()
        .replace(".input.json", &format!(".{suffix}.csv"));
    std::fs::read_to_string(&name).wrap_err_with(|| format!("missing expected output {name}"))
}

#[test]
fn run_test_files() -> Result<()> {
    let mut inputs = glob("tests/test-cases/*.input.json")?.collect::<Result<Vec<_>, _>>()?;
    inputs.sort();
    assert!(!inputs.is_empty(), "no test cases found");

    for input in &inputs {
        let case: TestCase = serde_json::from_reader(BufReader::new(File::open(input)?))
            .wrap_err_with(|| format!("Failed to parse test case {input:?}"))?;
        let rates = RateTable::from_json_reader(case.rates.to_string().as_bytes())?;
        let portfolio = replay(&rates, case.commands);

        let mut dividends = Vec::new();
        write_dividends_csv(&portfolio.dividends, &mut dividends)?;
        assert_eq!(
            String::from_utf8_lossy(&dividends),
            expected(input, "dividends")?,
            "dividend export of {input:?} didn't match"
        );

        let mut shares = Vec::new();
        write_shares_csv(&portfolio.shares, &portfolio.prices, &rates, &mut shares)?;
        assert_eq!(
            String::from_utf8_lossy(&shares),
            expected(input, "shares")?,
            "share export of {input:?} didn't match"
        );
    }

    Ok(())
}

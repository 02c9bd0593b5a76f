//! Writes a deterministic Crunchbase-style `sample_companies.csv` for trying
//! out the dashboard. Optional first argument: output path.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use insight_dash::data::export::to_csv_bytes;
use insight_dash::data::model::{CellValue, Column, Table};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const PREFIXES: &[&str] = &["Nova", "Blue", "Quantum", "Bright", "Iron", "Lumen", "Vertex", "Atlas"];
const SUFFIXES: &[&str] = &["Labs", "AI", "Health", "Pay", "Robotics", "Cloud", "Bio", "Works"];
const CATEGORIES: &[&str] = &["Fintech", "Healthcare", "SaaS", "Hardware", "E-Commerce"];
const COUNTRIES: &[&str] = &["US", "DE", "FR", "GB", "IN", "BR"];
const STAGES: &[&str] = &["Seed", "Series A", "Series B", "Series C"];

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_companies.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let epoch = NaiveDate::from_ymd_opt(2005, 1, 1).context("invalid base date")?;
    let n_rows = 250;

    let mut name = Vec::with_capacity(n_rows);
    let mut category = Vec::with_capacity(n_rows);
    let mut country = Vec::with_capacity(n_rows);
    let mut stage = Vec::with_capacity(n_rows);
    let mut funding = Vec::with_capacity(n_rows);
    let mut employees = Vec::with_capacity(n_rows);
    let mut founded = Vec::with_capacity(n_rows);

    for i in 0..n_rows {
        let company = format!("{} {} {i}", rng.pick(PREFIXES), rng.pick(SUFFIXES));
        name.push(CellValue::Text(company));
        category.push(CellValue::Text(rng.pick(CATEGORIES).to_string()));
        country.push(CellValue::Text(rng.pick(COUNTRIES).to_string()));
        stage.push(CellValue::Text(rng.pick(STAGES).to_string()));

        // Roughly one in ten companies has undisclosed funding.
        if rng.next_f64() < 0.1 {
            funding.push(CellValue::Null);
        } else {
            let usd = (10f64.powf(5.0 + rng.next_f64() * 3.5) / 1000.0).round() * 1000.0;
            funding.push(CellValue::Number(usd));
        }
        employees.push(CellValue::Number((5.0 + rng.next_f64() * 995.0).round()));

        let offset = Days::new(rng.next_u64() % (18 * 365));
        let date = epoch.checked_add_days(offset).context("date out of range")?;
        founded.push(CellValue::Date(date));
    }

    let table = Table::new(vec![
        Column::new("name", name),
        Column::new("category", category),
        Column::new("country", country),
        Column::new("last_funding_type", stage),
        Column::new("funding_usd", funding),
        Column::new("employees", employees),
        Column::new("founded_on", founded),
    ])?;

    let bytes = to_csv_bytes(&table)?;
    log::info!(
        "Encoded {} rows x {} columns ({} bytes)",
        table.row_count(),
        table.columns().len(),
        bytes.len()
    );
    std::fs::write(&output_path, bytes).with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {} companies to {output_path}", table.row_count());
    Ok(())
}

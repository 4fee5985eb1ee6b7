use anyhow::Result;

use crate::format::format_check;

/// Print whether each number is prime
pub fn cmd_check(numbers: &[u64]) -> Result<()> {
  for &n in numbers {
    println!("{}", format_check(n));
  }
  Ok(())
}

//! Primality oracle.
//!
//! Plain trial division by odd divisors up to the ceiling of the square root.
//! Each call costs O(sqrt(n)); throughput comes from scanning disjoint ranges in
//! parallel, not from a smarter test, so there is no sieve and no cache here.

/// Returns true if `n` is prime.
///
/// Defined for every `u64`: values below 2 are not prime and 2 is prime.
pub fn is_prime(n: u64) -> bool {
  if n < 2 {
    return false;
  }
  if n % 2 == 0 {
    return n == 2;
  }

  let limit = ceil_sqrt(n);
  let mut t = 3;
  while t <= limit {
    if n % t == 0 {
      return false;
    }
    t += 2;
  }
  true
}

/// Integer ceiling of the square root.
fn ceil_sqrt(n: u64) -> u64 {
  let root = n.isqrt();
  if root * root < n { root + 1 } else { root }
}

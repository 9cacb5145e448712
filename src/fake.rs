//! Pseudo-random player data.

use rand::{Rng, distr::Alphanumeric, seq::IndexedRandom};

use crate::player::PlayerCreateRequest;

const FIRST_NAMES: &[&str] = &[
    "Amelia", "Benjamin", "Chloe", "Daniel", "Eleanor", "Felix", "Grace", "Henry", "Isla",
    "Jack", "Kathryn", "Liam", "Maya", "Nathan", "Olivia", "Patrick", "Quinn", "Rosa", "Samuel",
    "Tessa", "Ursula", "Victor", "Willa", "Xavier", "Yasmin", "Zachary",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Barnes", "Carter", "Dalton", "Ellison", "Fischer", "Garner", "Hughes", "Ingram",
    "Jensen", "Keller", "Lambert", "Morrow", "Nolan", "Ortega", "Parker", "Quigley", "Ramsey",
    "Sutton", "Thornton", "Underwood", "Vaughn", "Whitaker", "Young",
];

const PASSWORD_LEN: std::ops::Range<usize> = 4..20;

/// Builds create requests with distinct emails and usernames.
///
/// Every request from one generator carries a sequence number in its email and
/// username, and the generator itself carries a random tag, so neither repeats
/// within a batch and collisions across runs are unlikely.
#[derive(Debug)]
pub struct PlayerFaker<R> {
    rng: R,
    currency_code: String,
    tag: u32,
    seq: usize,
}

impl<R: Rng> PlayerFaker<R> {
    pub fn new(mut rng: R, currency_code: impl Into<String>) -> Self {
        let tag = rng.random_range(10_000..100_000);
        Self {
            rng,
            currency_code: currency_code.into(),
            tag,
            seq: 0,
        }
    }

    pub fn password(&mut self) -> String {
        let len = self.rng.random_range(PASSWORD_LEN);
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }

    pub fn next_request(&mut self) -> PlayerCreateRequest {
        self.seq += 1;
        let name = FIRST_NAMES.choose(&mut self.rng).copied().unwrap_or("Alex");
        let surname = LAST_NAMES.choose(&mut self.rng).copied().unwrap_or("Smith");
        let password = self.password();

        let email = format!(
            "{}.{}.{}{}@example.com",
            name.to_lowercase(),
            surname.to_lowercase(),
            self.tag,
            self.seq
        );
        let username = format!(
            "{}{}{}_{}",
            name.to_lowercase(),
            &surname[..1].to_lowercase(),
            self.tag,
            self.seq
        );

        PlayerCreateRequest {
            currency_code: self.currency_code.clone(),
            email,
            name: name.to_string(),
            password_change: password.clone(),
            password_repeat: password,
            surname: surname.to_string(),
            username,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn batch_is_distinct() {
        let mut faker = PlayerFaker::new(StdRng::seed_from_u64(7), "EUR");
        let batch: Vec<_> = (0..12).map(|_| faker.next_request()).collect();

        let emails: HashSet<_> = batch.iter().map(|r| r.email.as_str()).collect();
        let usernames: HashSet<_> = batch.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(emails.len(), 12);
        assert_eq!(usernames.len(), 12);
    }

    #[test]
    fn request_shape() {
        let mut faker = PlayerFaker::new(StdRng::seed_from_u64(99), "EUR");
        for _ in 0..50 {
            let request = faker.next_request();
            assert_eq!(request.currency_code, "EUR");
            assert_eq!(request.password_change, request.password_repeat);
            assert!(PASSWORD_LEN.contains(&request.password_change.len()));
            assert!(request.password_change.chars().all(|c| c.is_ascii_alphanumeric()));
            assert!(FIRST_NAMES.contains(&request.name.as_str()));
            assert!(LAST_NAMES.contains(&request.surname.as_str()));
            assert!(request.email.ends_with("@example.com"));
            assert!(request.email.starts_with(&request.name.to_lowercase()));
        }
    }

    #[test]
    fn same_seed_same_data() {
        let a = PlayerFaker::new(StdRng::seed_from_u64(1), "EUR").next_request();
        let b = PlayerFaker::new(StdRng::seed_from_u64(1), "EUR").next_request();
        assert_eq!(a, b);
    }
}

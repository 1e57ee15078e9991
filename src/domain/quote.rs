/// Result quote selection.

use rand::Rng;

use super::mood::MoodId;

/// Shown when a mood somehow has no quotes.
pub const DEFAULT_QUOTE: &str = "Respire";

/// Uniform draw from a quote list, or the default for an empty list.
pub fn pick_from<R: Rng + ?Sized>(rng: &mut R, quotes: &[&str]) -> String {
    if quotes.is_empty() {
        return DEFAULT_QUOTE.to_string();
    }
    quotes[rng.random_range(0..quotes.len())].to_string()
}

/// One closing quote for a finished session.
pub fn pick_quote<R: Rng + ?Sized>(rng: &mut R, mood: MoodId) -> String {
    pick_from(rng, mood.info().quotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mood::ALL_MOODS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn two_quotes_are_drawn_evenly() {
        let mut rng = StdRng::seed_from_u64(1234);
        let quotes = ["a", "b"];
        let mut a = 0;
        let mut b = 0;
        for _ in 0..1000 {
            match pick_from(&mut rng, &quotes).as_str() {
                "a" => a += 1,
                "b" => b += 1,
                other => panic!("unexpected quote {other}"),
            }
        }
        assert_eq!(a + b, 1000);
        assert!((400..=600).contains(&a), "a drawn {a} times");
    }

    #[test]
    fn empty_list_falls_back() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pick_from(&mut rng, &[]), DEFAULT_QUOTE);
    }

    #[test]
    fn mood_quotes_come_from_the_mood() {
        let mut rng = StdRng::seed_from_u64(9);
        for mood in ALL_MOODS {
            let q = pick_quote(&mut rng, mood);
            assert!(mood.info().quotes.iter().any(|known| *known == q));
        }
    }
}

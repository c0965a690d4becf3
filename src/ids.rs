use rand::Rng;

/// Random lowercase ASCII string of `len` characters.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Participant id for one session attempt: `<prefix>-<8 random chars>`.
pub fn participant_id(prefix: &str) -> String {
    format!("{}-{}", prefix, random_string(8))
}

/// Shareable room id shaped like `abc-defg-hij`.
pub fn create_room_id() -> String {
    format!(
        "{}-{}-{}",
        random_string(3),
        random_string(4),
        random_string(3)
    )
}

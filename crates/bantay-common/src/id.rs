use snowflake::SnowflakeIdBucket;
use std::sync::Mutex;

struct Generator {
    machine_id: i32,
    node_id: i32,
    bucket: SnowflakeIdBucket,
}

static ID_GENERATOR: Mutex<Option<Generator>> = Mutex::new(None);

/// Configures the Snowflake generator used for every record id. Calling it
/// again with the same ids keeps the running sequence.
///
/// `machine_id` and `node_id` must each be in `0..=31`.
pub fn init(machine_id: i32, node_id: i32) {
    let mut gen = ID_GENERATOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if matches!(&*gen, Some(g) if g.machine_id == machine_id && g.node_id == node_id) {
        return;
    }
    *gen = Some(Generator {
        machine_id,
        node_id,
        bucket: SnowflakeIdBucket::new(machine_id, node_id),
    });
}

/// Returns the next record id as a decimal string.
pub fn next_id() -> String {
    let mut gen = ID_GENERATOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let g = gen.get_or_insert_with(|| Generator {
        machine_id: 1,
        node_id: 1,
        bucket: SnowflakeIdBucket::new(1, 1),
    });
    g.bucket.get_id().to_string()
}

/// Record ids travel as JSON numbers from some forms and as strings from
/// others; both normalize to the decimal string form.
pub fn looks_like_id(value: &str) -> bool {
    !value.is_empty() && value.len() <= 20 && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn next_id_is_unique_and_numeric() {
        init(1, 1);
        let mut ids = HashSet::new();
        for _ in 0..500 {
            let id = next_id();
            assert!(looks_like_id(&id), "not a numeric id: {id}");
            assert!(ids.insert(id), "duplicate id generated");
        }
    }

    #[test]
    fn looks_like_id_rejects_non_digits() {
        assert!(looks_like_id("5"));
        assert!(!looks_like_id(""));
        assert!(!looks_like_id("5a"));
        assert!(!looks_like_id(" 5"));
    }
}

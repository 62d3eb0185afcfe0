use crate::module::job::model::JobRecord;
use crate::module::job::schema::{HashDirection, HashScheme};
use sha2::{Digest, Sha256};

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn content_digest(scheme: HashScheme, identifier: &str, content: &str) -> String {
    match scheme {
        HashScheme::Salted => {
            let mut hasher = Sha256::new();
            hasher.update(identifier.as_bytes());
            hasher.update(content.as_bytes());
            hex::encode(hasher.finalize())
        }
        HashScheme::Legacy => sha256_hex(content),
    }
}

pub fn verify(direction: HashDirection, job: &JobRecord) -> bool {
    let (commitment, content) = match direction {
        HashDirection::Input => (job.input_hash.as_deref(), job.input.as_deref()),
        HashDirection::Output => (job.result_hash.as_deref(), job.output.as_deref()),
    };
    match (commitment, content) {
        (Some(commitment), Some(content)) => {
            let recomputed =
                content_digest(job.hash_scheme, &job.identifier_from_purchaser, content);
            recomputed.eq_ignore_ascii_case(commitment)
        }
        _ => false,
    }
}

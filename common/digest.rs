use crate::error::DigestError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{btree_set, BTreeMap, BTreeSet};

static DIGEST_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new("^([0-9a-f]+):([0-9]+)$").expect("Failed to compile digest regex"));

static READ_RESOURCE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^(?:(.+)/)?blobs/([0-9a-f]+)/([0-9]+)$")
        .expect("Failed to compile read resource name regex")
});

static WRITE_RESOURCE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^(?:(.+)/)?uploads/[^/]+/blobs/([0-9a-f]+)/([0-9]+)(?:/.*)?$")
        .expect("Failed to compile write resource name regex")
});

/// The address of an object: an instance name, plus the hash and size of
/// the object's contents. Two digests are only equal if all three match.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Digest {
    instance: String,
    hash: String,
    size_bytes: i64,
}

// Intentionally using getters so that Digest creation is forced through
// the validation logic in Digest::new.
impl Digest {
    pub fn new(
        instance: impl Into<String>,
        hash: impl Into<String>,
        size_bytes: i64,
    ) -> Result<Digest, DigestError> {
        let hash = hash.into();
        if hash.is_empty() || !hash.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(DigestError::InvalidHash(hash));
        }
        if size_bytes < 0 {
            return Err(DigestError::InvalidSize(size_bytes));
        }
        Ok(Digest {
            instance: instance.into(),
            hash,
            size_bytes,
        })
    }

    /// Combines the instance name of a request with a digest message that
    /// was part of the same request.
    pub fn from_partial_digest(
        instance: &str,
        partial_digest: Option<&protos::re::Digest>,
    ) -> Result<Digest, DigestError> {
        let partial_digest = partial_digest.ok_or(DigestError::MissingDigest)?;
        Digest::new(instance, partial_digest.hash.as_str(), partial_digest.size_bytes)
    }

    /// Parses `{instance}/blobs/{hash}/{size}`, as used by ByteStream reads.
    pub fn from_read_resource_name(resource_name: &str) -> Result<Digest, DigestError> {
        Self::from_resource_name(&READ_RESOURCE_NAME_REGEX, resource_name)
    }

    /// Parses `{instance}/uploads/{uuid}/blobs/{hash}/{size}`, as used by
    /// ByteStream writes. Anything following the size is ignored.
    pub fn from_write_resource_name(resource_name: &str) -> Result<Digest, DigestError> {
        Self::from_resource_name(&WRITE_RESOURCE_NAME_REGEX, resource_name)
    }

    fn from_resource_name(regex: &Regex, resource_name: &str) -> Result<Digest, DigestError> {
        let invalid = || DigestError::InvalidResourceName(resource_name.to_string());
        let matches = regex.captures(resource_name).ok_or_else(invalid)?;
        let size_bytes = matches[3].parse::<i64>().map_err(|_| invalid())?;
        Digest::new(
            matches.get(1).map_or("", |m| m.as_str()),
            &matches[2],
            size_bytes,
        )
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn size_bytes(&self) -> i64 {
        self.size_bytes
    }

    /// The digest without its instance name, as it appears in messages.
    pub fn to_partial_digest(&self) -> protos::re::Digest {
        protos::re::Digest {
            hash: self.hash.clone(),
            size_bytes: self.size_bytes,
        }
    }

    pub fn read_resource_name(&self) -> String {
        format!("{}blobs/{}/{}", self.instance_prefix(), self.hash, self.size_bytes)
    }

    pub fn write_resource_name(&self, upload_id: impl std::fmt::Display) -> String {
        format!(
            "{}uploads/{upload_id}/blobs/{}/{}",
            self.instance_prefix(),
            self.hash,
            self.size_bytes
        )
    }

    fn instance_prefix(&self) -> String {
        if self.instance.is_empty() {
            String::new()
        } else {
            format!("{}/", self.instance)
        }
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.hash, self.size_bytes, self.instance)
    }
}

impl From<Digest> for protos::re::Digest {
    fn from(d: Digest) -> Self {
        protos::re::Digest {
            hash: d.hash,
            size_bytes: d.size_bytes,
        }
    }
}

/// Parses `{hash}:{size}` into a digest for the default instance.
impl std::str::FromStr for Digest {
    type Err = DigestError;

    fn from_str(digest: &str) -> Result<Digest, Self::Err> {
        let matches = DIGEST_REGEX
            .captures(digest)
            .ok_or_else(|| DigestError::InvalidDigest(digest.to_string()))?;
        let size_bytes = matches[2]
            .parse::<i64>()
            .map_err(|_| DigestError::InvalidDigest(digest.to_string()))?;
        Digest::new("", &matches[1], size_bytes)
    }
}

/// An immutable set of digests. Iteration order is sorted, which keeps
/// responses deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigestSet {
    digests: BTreeSet<Digest>,
}

impl DigestSet {
    pub const EMPTY: DigestSet = DigestSet {
        digests: BTreeSet::new(),
    };

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.digests.contains(digest)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Digest> {
        self.digests.iter()
    }

    /// Splits the set into one set per instance name. Protocols that can
    /// only address a single instance per call need to be queried once for
    /// every entry.
    pub fn partition_by_instance(&self) -> BTreeMap<String, DigestSet> {
        let mut partitions: BTreeMap<String, DigestSetBuilder> = BTreeMap::new();
        for digest in &self.digests {
            partitions
                .entry(digest.instance.clone())
                .or_default()
                .add(digest.clone());
        }
        partitions
            .into_iter()
            .map(|(instance, builder)| (instance, builder.build()))
            .collect()
    }

    pub fn to_partial_digests(&self) -> Vec<protos::re::Digest> {
        self.digests.iter().map(Digest::to_partial_digest).collect()
    }
}

impl FromIterator<Digest> for DigestSet {
    fn from_iter<I: IntoIterator<Item = Digest>>(iter: I) -> Self {
        DigestSet {
            digests: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DigestSet {
    type Item = Digest;
    type IntoIter = btree_set::IntoIter<Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.digests.into_iter()
    }
}

impl<'a> IntoIterator for &'a DigestSet {
    type Item = &'a Digest;
    type IntoIter = btree_set::Iter<'a, Digest>;

    fn into_iter(self) -> Self::IntoIter {
        self.digests.iter()
    }
}

/// Accumulates digests, dropping duplicates, until frozen with `build`.
#[derive(Debug, Default)]
pub struct DigestSetBuilder {
    digests: BTreeSet<Digest>,
}

impl DigestSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, digest: Digest) -> &mut Self {
        self.digests.insert(digest);
        self
    }

    pub fn build(self) -> DigestSet {
        DigestSet {
            digests: self.digests,
        }
    }
}

impl Extend<Digest> for DigestSetBuilder {
    fn extend<I: IntoIterator<Item = Digest>>(&mut self, iter: I) {
        self.digests.extend(iter);
    }
}

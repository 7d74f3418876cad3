//! Signature algorithm identifiers and the defaulting rules that pick one
//! for a given issuer key.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use yasna::models::ObjectIdentifier;
use yasna::DERWriter;

use crate::Error;

/// A message digest algorithm usable for fingerprints and signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlg {
	/// MD5, retained for legacy fingerprints and the pre-6.0 verifier only
	Md5,
	/// SHA-1
	Sha1,
	/// SHA-256
	Sha256,
	/// SHA-384
	Sha384,
	/// SHA-512
	Sha512,
}

impl HashAlg {
	/// Digests `data` with this algorithm.
	pub fn digest(&self, data: &[u8]) -> Vec<u8> {
		match self {
			HashAlg::Md5 => Md5::digest(data).to_vec(),
			HashAlg::Sha1 => Sha1::digest(data).to_vec(),
			HashAlg::Sha256 => Sha256::digest(data).to_vec(),
			HashAlg::Sha384 => Sha384::digest(data).to_vec(),
			HashAlg::Sha512 => Sha512::digest(data).to_vec(),
		}
	}
	/// Resolves common spellings such as `SHA-384` or `sha384`.
	pub fn from_name(name: &str) -> Option<Self> {
		match name.to_ascii_uppercase().replace('-', "").as_str() {
			"MD5" => Some(HashAlg::Md5),
			"SHA1" => Some(HashAlg::Sha1),
			"SHA256" => Some(HashAlg::Sha256),
			"SHA384" => Some(HashAlg::Sha384),
			"SHA512" => Some(HashAlg::Sha512),
			_ => None,
		}
	}
	/// The conventional display name, e.g. `SHA384`.
	pub fn name(&self) -> &'static str {
		match self {
			HashAlg::Md5 => "MD5",
			HashAlg::Sha1 => "SHA1",
			HashAlg::Sha256 => "SHA256",
			HashAlg::Sha384 => "SHA384",
			HashAlg::Sha512 => "SHA512",
		}
	}
}

/// The public key family a signature algorithm applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
	/// RSA keys
	Rsa,
	/// Elliptic curve keys
	Ec,
	/// DSA keys
	Dsa,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SignatureAlgorithmParams {
	/// Omit the parameters
	None,
	/// Write null parameters
	Null,
}

/// An X.509 signature algorithm.
#[derive(Debug)]
pub struct SignatureAlgorithm {
	name: &'static str,
	hash: HashAlg,
	key_family: KeyFamily,
	oid_components: &'static [u64],
	params: SignatureAlgorithmParams,
}

impl PartialEq for SignatureAlgorithm {
	fn eq(&self, other: &Self) -> bool {
		self.oid_components == other.oid_components
	}
}

impl Eq for SignatureAlgorithm {}

impl SignatureAlgorithm {
	pub(crate) fn iter() -> std::slice::Iter<'static, &'static SignatureAlgorithm> {
		static ALGORITHMS: &[&SignatureAlgorithm] = &[
			&SHA1_WITH_RSA,
			&SHA256_WITH_RSA,
			&SHA384_WITH_RSA,
			&SHA512_WITH_RSA,
			&SHA1_WITH_ECDSA,
			&SHA256_WITH_ECDSA,
			&SHA384_WITH_ECDSA,
			&SHA512_WITH_ECDSA,
			&SHA1_WITH_DSA,
			&SHA256_WITH_DSA,
			&SHA384_WITH_DSA,
			&SHA512_WITH_DSA,
		];
		ALGORITHMS.iter()
	}

	/// Retrieve the SignatureAlgorithm for the provided OID
	pub fn from_oid(oid: &[u64]) -> Result<&'static SignatureAlgorithm, Error> {
		for algo in Self::iter() {
			if algo.oid_components == oid {
				return Ok(algo);
			}
		}
		Err(Error::UnsupportedSignatureAlgorithm)
	}

	/// The algorithm for a hash/key-family pair, when one exists.
	pub fn lookup(
		family: KeyFamily,
		hash: HashAlg,
	) -> Result<&'static SignatureAlgorithm, Error> {
		for algo in Self::iter() {
			if algo.key_family == family && algo.hash == hash {
				return Ok(algo);
			}
		}
		Err(Error::UnsupportedSignatureAlgorithm)
	}

	/// The JCA-style display name, e.g. `SHA384withRSA`.
	pub fn name(&self) -> &'static str {
		self.name
	}
	/// The digest the algorithm applies before signing.
	pub fn hash(&self) -> HashAlg {
		self.hash
	}
	/// The key family the algorithm signs with.
	pub fn key_family(&self) -> KeyFamily {
		self.key_family
	}
	/// The OID components of the algorithm identifier.
	pub fn oid_components(&self) -> &'static [u64] {
		self.oid_components
	}

	/// Writes the algorithm identifier as it appears inside a signature
	pub(crate) fn write_alg_ident(&self, writer: DERWriter) {
		writer.write_sequence(|writer| {
			writer
				.next()
				.write_oid(&ObjectIdentifier::from_slice(self.oid_components));
			match self.params {
				SignatureAlgorithmParams::None => (),
				SignatureAlgorithmParams::Null => {
					writer.next().write_null();
				},
			}
		});
	}
}

/// RSA signing with PKCS#1 1.5 padding and SHA-1, for short-key peers
pub static SHA1_WITH_RSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA1withRSA",
	hash: HashAlg::Sha1,
	key_family: KeyFamily::Rsa,
	// sha1WithRSAEncryption in RFC 3279
	oid_components: &[1, 2, 840, 113549, 1, 1, 5],
	params: SignatureAlgorithmParams::Null,
};

/// RSA signing with PKCS#1 1.5 padding and SHA-256 as per [RFC 4055](https://tools.ietf.org/html/rfc4055)
pub static SHA256_WITH_RSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA256withRSA",
	hash: HashAlg::Sha256,
	key_family: KeyFamily::Rsa,
	oid_components: &[1, 2, 840, 113549, 1, 1, 11],
	params: SignatureAlgorithmParams::Null,
};

/// RSA signing with PKCS#1 1.5 padding and SHA-384 as per [RFC 4055](https://tools.ietf.org/html/rfc4055)
pub static SHA384_WITH_RSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA384withRSA",
	hash: HashAlg::Sha384,
	key_family: KeyFamily::Rsa,
	oid_components: &[1, 2, 840, 113549, 1, 1, 12],
	params: SignatureAlgorithmParams::Null,
};

/// RSA signing with PKCS#1 1.5 padding and SHA-512 as per [RFC 4055](https://tools.ietf.org/html/rfc4055)
pub static SHA512_WITH_RSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA512withRSA",
	hash: HashAlg::Sha512,
	key_family: KeyFamily::Rsa,
	oid_components: &[1, 2, 840, 113549, 1, 1, 13],
	params: SignatureAlgorithmParams::Null,
};

/// ECDSA with SHA-1 as per [RFC 3279](https://tools.ietf.org/html/rfc3279)
pub static SHA1_WITH_ECDSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA1withECDSA",
	hash: HashAlg::Sha1,
	key_family: KeyFamily::Ec,
	oid_components: &[1, 2, 840, 10045, 4, 1],
	params: SignatureAlgorithmParams::None,
};

/// ECDSA with SHA-256 as per [RFC 5758](https://tools.ietf.org/html/rfc5758#section-3.2)
pub static SHA256_WITH_ECDSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA256withECDSA",
	hash: HashAlg::Sha256,
	key_family: KeyFamily::Ec,
	oid_components: &[1, 2, 840, 10045, 4, 3, 2],
	params: SignatureAlgorithmParams::None,
};

/// ECDSA with SHA-384 as per [RFC 5758](https://tools.ietf.org/html/rfc5758#section-3.2)
pub static SHA384_WITH_ECDSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA384withECDSA",
	hash: HashAlg::Sha384,
	key_family: KeyFamily::Ec,
	oid_components: &[1, 2, 840, 10045, 4, 3, 3],
	params: SignatureAlgorithmParams::None,
};

/// ECDSA with SHA-512 as per [RFC 5758](https://tools.ietf.org/html/rfc5758#section-3.2)
pub static SHA512_WITH_ECDSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA512withECDSA",
	hash: HashAlg::Sha512,
	key_family: KeyFamily::Ec,
	oid_components: &[1, 2, 840, 10045, 4, 3, 4],
	params: SignatureAlgorithmParams::None,
};

/// DSA with SHA-1 as per [RFC 3279](https://tools.ietf.org/html/rfc3279)
pub static SHA1_WITH_DSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA1withDSA",
	hash: HashAlg::Sha1,
	key_family: KeyFamily::Dsa,
	oid_components: &[1, 2, 840, 10040, 4, 3],
	params: SignatureAlgorithmParams::None,
};

/// DSA with SHA-256 as per [RFC 5758](https://tools.ietf.org/html/rfc5758#section-3.1)
pub static SHA256_WITH_DSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA256withDSA",
	hash: HashAlg::Sha256,
	key_family: KeyFamily::Dsa,
	oid_components: &[2, 16, 840, 1, 101, 3, 4, 3, 2],
	params: SignatureAlgorithmParams::None,
};

/// DSA with SHA-384
pub static SHA384_WITH_DSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA384withDSA",
	hash: HashAlg::Sha384,
	key_family: KeyFamily::Dsa,
	oid_components: &[2, 16, 840, 1, 101, 3, 4, 3, 3],
	params: SignatureAlgorithmParams::None,
};

/// DSA with SHA-512
pub static SHA512_WITH_DSA: SignatureAlgorithm = SignatureAlgorithm {
	name: "SHA512withDSA",
	hash: HashAlg::Sha512,
	key_family: KeyFamily::Dsa,
	oid_components: &[2, 16, 840, 1, 101, 3, 4, 3, 4],
	params: SignatureAlgorithmParams::None,
};

/// Default hash when the caller gives no hint.
pub const DEFAULT_HASH: HashAlg = HashAlg::Sha384;

/// EC keys below this field size are signed with SHA-1.
const SHORT_EC_FIELD_BITS: u32 = 384;
/// RSA keys below this modulus size are signed with SHA-1.
const SHORT_RSA_MODULUS_BITS: u32 = 768;

/// Picks a signature algorithm for a key of the given family and size.
///
/// `always_prefer_sha1` wins over everything. Otherwise the hash hint (or
/// SHA-384) is used, unless the key is too short for it: some providers
/// reject a strong hash paired with a weak key, so short keys are forced
/// down to the SHA-1 variant regardless of the hint.
pub fn select_signature_algorithm(
	family: KeyFamily,
	key_bits: u32,
	hash_hint: Option<HashAlg>,
	always_prefer_sha1: bool,
) -> Result<&'static SignatureAlgorithm, Error> {
	let short_key = match family {
		KeyFamily::Ec => key_bits < SHORT_EC_FIELD_BITS,
		KeyFamily::Rsa => key_bits < SHORT_RSA_MODULUS_BITS,
		KeyFamily::Dsa => false,
	};
	let hash = if always_prefer_sha1 || short_key {
		HashAlg::Sha1
	} else {
		hash_hint.unwrap_or(DEFAULT_HASH)
	};
	SignatureAlgorithm::lookup(family, hash)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_hash_is_sha384() {
		let alg = select_signature_algorithm(KeyFamily::Rsa, 2048, None, false).unwrap();
		assert_eq!(alg.name(), "SHA384withRSA");
		let alg = select_signature_algorithm(KeyFamily::Ec, 384, None, false).unwrap();
		assert_eq!(alg.name(), "SHA384withECDSA");
	}

	#[test]
	fn hash_hint_respected_for_adequate_keys() {
		let alg =
			select_signature_algorithm(KeyFamily::Rsa, 2048, Some(HashAlg::Sha256), false).unwrap();
		assert_eq!(alg.name(), "SHA256withRSA");
		let alg =
			select_signature_algorithm(KeyFamily::Dsa, 1024, Some(HashAlg::Sha256), false).unwrap();
		assert_eq!(alg.name(), "SHA256withDSA");
	}

	#[test]
	fn short_keys_downgrade_to_sha1_regardless_of_hint() {
		let alg =
			select_signature_algorithm(KeyFamily::Rsa, 512, Some(HashAlg::Sha384), false).unwrap();
		assert_eq!(alg.name(), "SHA1withRSA");
		let alg =
			select_signature_algorithm(KeyFamily::Ec, 256, Some(HashAlg::Sha512), false).unwrap();
		assert_eq!(alg.name(), "SHA1withECDSA");
	}

	#[test]
	fn prefer_sha1_override_wins() {
		let alg =
			select_signature_algorithm(KeyFamily::Rsa, 4096, Some(HashAlg::Sha512), true).unwrap();
		assert_eq!(alg.name(), "SHA1withRSA");
	}

	#[test]
	fn md5_combination_rejected() {
		assert_eq!(
			select_signature_algorithm(KeyFamily::Rsa, 2048, Some(HashAlg::Md5), false),
			Err(Error::UnsupportedSignatureAlgorithm)
		);
	}

	#[test]
	fn hash_names_resolve() {
		assert_eq!(HashAlg::from_name("sha-384"), Some(HashAlg::Sha384));
		assert_eq!(HashAlg::from_name("SHA1"), Some(HashAlg::Sha1));
		assert_eq!(HashAlg::from_name("whirlpool"), None);
	}
}

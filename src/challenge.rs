//! Nonce-based certificate possession verification.
//!
//! A peer proves it holds both a certificate and a password-derived secret
//! by sending a verifier digest over an insecure channel; no key material
//! ever travels. Two schemes coexist: the current SHA-512 construction and
//! a legacy MD5 one kept only for wire compatibility with old peers.
//!
//! A verifier mismatch is an ordinary `false`, never an error. Errors are
//! reserved for verifiers that cannot be evaluated at all, such as
//! undecodable hex. A received digest equal to the [`NOPASS`] sentinel
//! means the sender never had the password, and always verifies false.

use log::warn;
use md5::{Digest, Md5};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use sha_crypt::{sha512_crypt_b64, Sha512Params};

use crate::Error;

/// Sentinel digest value sent when the password was unavailable.
pub const NOPASS: &str = "NOPASS";

/// Header name prefix of the current scheme; the identity provider id is
/// appended.
pub const CHECK2_HEADER_PREFIX: &str = "X-Cert-Check2-";
/// Header name prefix of the legacy scheme.
pub const LEGACY_CHECK_HEADER_PREFIX: &str = "X-Cert-Check-";

/// Size of generated nonces in bytes.
const NONCE_LEN: usize = 16;

/// A fresh random nonce for one verification attempt.
pub fn generate_nonce() -> Vec<u8> {
	let mut nonce = vec![0u8; NONCE_LEN];
	OsRng.fill_bytes(&mut nonce);
	nonce
}

/// Derives the password-bound secret with the SHA-512 crypt function.
pub fn derive_secret(password: &str, salt: &[u8]) -> Result<Vec<u8>, Error> {
	let params = Sha512Params::default();
	sha512_crypt_b64(password.as_bytes(), salt, &params)
		.map(String::into_bytes)
		.map_err(|_| Error::SecretDerivationFailed)
}

/// Current-scheme verifier:
/// SHA-512(secret ‖ SHA-512(secret ‖ clientNonce ‖ serverNonce ‖ certDER))
fn compute_check2_verifier(
	secret: &[u8],
	client_nonce: &[u8],
	server_nonce: &[u8],
	cert_der: &[u8],
) -> Vec<u8> {
	let mut inner = Sha512::new();
	inner.update(secret);
	inner.update(client_nonce);
	inner.update(server_nonce);
	inner.update(cert_der);
	let inner = inner.finalize();
	let mut outer = Sha512::new();
	outer.update(secret);
	outer.update(inner);
	outer.finalize().to_vec()
}

/// Comparison that inspects every byte before answering.
fn digests_match(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}
	let mut diff = 0u8;
	for (x, y) in a.iter().zip(b) {
		diff |= x ^ y;
	}
	diff == 0
}

/// The current certificate verification scheme.
///
/// The header value is `serverNonceHex; checkHashHex; userSaltHex`,
/// exactly three semicolon-separated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateCheck2Info {
	provider_id: String,
	server_nonce: Vec<u8>,
	/// Lower-case hex, or the `NOPASS` sentinel
	check_hash: String,
	user_salt: Vec<u8>,
}

impl CertificateCheck2Info {
	/// Computes a verifier for sending. A `None` password produces the
	/// `NOPASS` sentinel instead of a digest.
	pub fn create(
		provider_id: &str,
		password: Option<&str>,
		user_salt: &[u8],
		client_nonce: &[u8],
		cert_der: &[u8],
	) -> Result<Self, Error> {
		let server_nonce = generate_nonce();
		let check_hash = match password {
			None => NOPASS.to_string(),
			Some(password) => {
				let secret = derive_secret(password, user_salt)?;
				hex::encode(compute_check2_verifier(
					&secret,
					client_nonce,
					&server_nonce,
					cert_der,
				))
			},
		};
		Ok(Self {
			provider_id: provider_id.to_string(),
			server_nonce,
			check_hash,
			user_salt: user_salt.to_vec(),
		})
	}

	/// Parses a received header value. Anything other than exactly three
	/// fields, or undecodable hex, rejects the header as absent.
	pub fn from_header(provider_id: &str, value: &str) -> Option<Self> {
		let fields: Vec<&str> = value.split(';').map(str::trim).collect();
		if fields.len() != 3 {
			warn!(
				"rejecting certificate check header with {} fields instead of 3",
				fields.len()
			);
			return None;
		}
		let server_nonce = match hex::decode(fields[0]) {
			Ok(nonce) => nonce,
			Err(_) => {
				warn!("rejecting certificate check header with undecodable server nonce");
				return None;
			},
		};
		let user_salt = match hex::decode(fields[2]) {
			Ok(salt) => salt,
			Err(_) => {
				warn!("rejecting certificate check header with undecodable user salt");
				return None;
			},
		};
		Some(Self {
			provider_id: provider_id.to_string(),
			server_nonce,
			check_hash: fields[1].to_string(),
			user_salt,
		})
	}

	/// True when the sender marked the verifier as uncomputable.
	pub fn is_no_pass(&self) -> bool {
		self.check_hash == NOPASS
	}

	/// The server-chosen nonce carried by this header.
	pub fn server_nonce(&self) -> &[u8] {
		&self.server_nonce
	}

	/// The crypt salt of the user the verifier is bound to.
	pub fn user_salt(&self) -> &[u8] {
		&self.user_salt
	}

	/// Renders the `(name, value)` header pair.
	pub fn as_http_header(&self) -> (String, String) {
		(
			format!("{CHECK2_HEADER_PREFIX}{}", self.provider_id),
			format!(
				"{}; {}; {}",
				hex::encode(&self.server_nonce),
				self.check_hash,
				hex::encode(&self.user_salt)
			),
		)
	}

	/// Recomputes the verifier from the given inputs and compares it with
	/// the received digest.
	///
	/// Returns `Ok(false)` on any mismatch or on the `NOPASS` sentinel.
	/// Errs only when the received digest is not evaluatable hex.
	pub fn check_cert(
		&self,
		cert_der: &[u8],
		password: &str,
		client_nonce: &[u8],
	) -> Result<bool, Error> {
		if self.is_no_pass() {
			return Ok(false);
		}
		let received = hex::decode(&self.check_hash).map_err(|_| Error::InvalidVerifierHex)?;
		let secret = derive_secret(password, &self.user_salt)?;
		let expected =
			compute_check2_verifier(&secret, client_nonce, &self.server_nonce, cert_der);
		Ok(digests_match(&received, &expected))
	}
}

/// The digest-auth-style credential hash of the legacy scheme, as
/// lower-case hex text.
pub fn legacy_ha1(username: &str, realm: &str, password: &str) -> String {
	let mut hasher = Md5::new();
	hasher.update(username.as_bytes());
	hasher.update(b":");
	hasher.update(realm.as_bytes());
	hasher.update(b":");
	hasher.update(password.as_bytes());
	hex::encode(hasher.finalize())
}

/// Legacy-scheme verifier:
/// MD5(H(A1) ‖ nonce ‖ providerId ‖ certDER ‖ H(A1)), where H(A1) is the
/// lower-case hex text of `legacy_ha1`.
fn compute_legacy_verifier(
	ha1_hex: &str,
	nonce: &[u8],
	provider_id: &str,
	cert_der: &[u8],
) -> Vec<u8> {
	let mut hasher = Md5::new();
	hasher.update(ha1_hex.as_bytes());
	hasher.update(nonce);
	hasher.update(provider_id.as_bytes());
	hasher.update(cert_der);
	hasher.update(ha1_hex.as_bytes());
	hasher.finalize().to_vec()
}

/// The pre-6.0 certificate verification scheme.
///
/// Weaker than the current scheme by design; preserved byte-for-byte for
/// compatibility with old peers and not to be used as a template for new
/// protocol work. The header value is `digestHex; realm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pre60CertificateCheckInfo {
	provider_id: String,
	/// Lower-case hex, or the `NOPASS` sentinel
	digest_hex: String,
	realm: String,
}

impl Pre60CertificateCheckInfo {
	/// Computes a legacy verifier for sending.
	pub fn create(
		provider_id: &str,
		username: &str,
		password: Option<&str>,
		realm: &str,
		nonce: &[u8],
		cert_der: &[u8],
	) -> Self {
		let digest_hex = match password {
			None => NOPASS.to_string(),
			Some(password) => {
				let ha1 = legacy_ha1(username, realm, password);
				hex::encode(compute_legacy_verifier(&ha1, nonce, provider_id, cert_der))
			},
		};
		Self {
			provider_id: provider_id.to_string(),
			digest_hex,
			realm: realm.to_string(),
		}
	}

	/// Parses a received legacy header value: digest and realm separated
	/// by a single semicolon, with one leading realm space stripped.
	pub fn from_header(provider_id: &str, value: &str) -> Option<Self> {
		let (digest_hex, realm) = match value.split_once(';') {
			Some(parts) => parts,
			None => {
				warn!("rejecting legacy certificate check header without separator");
				return None;
			},
		};
		let realm = realm.strip_prefix(' ').unwrap_or(realm);
		Some(Self {
			provider_id: provider_id.to_string(),
			digest_hex: digest_hex.to_string(),
			realm: realm.to_string(),
		})
	}

	/// True when the sender marked the verifier as uncomputable.
	pub fn is_no_pass(&self) -> bool {
		self.digest_hex == NOPASS
	}

	/// The realm the credential hash was computed under.
	pub fn realm(&self) -> &str {
		&self.realm
	}

	/// Renders the `(name, value)` header pair.
	pub fn as_http_header(&self) -> (String, String) {
		(
			format!("{LEGACY_CHECK_HEADER_PREFIX}{}", self.provider_id),
			format!("{}; {}", self.digest_hex, self.realm),
		)
	}

	/// Recomputes the legacy verifier and compares it with the received
	/// digest. Same mismatch semantics as the current scheme.
	pub fn check_cert(
		&self,
		cert_der: &[u8],
		username: &str,
		password: &str,
		nonce: &[u8],
	) -> Result<bool, Error> {
		if self.is_no_pass() {
			return Ok(false);
		}
		let received = hex::decode(&self.digest_hex).map_err(|_| Error::InvalidVerifierHex)?;
		let ha1 = legacy_ha1(username, &self.realm, password);
		let expected = compute_legacy_verifier(&ha1, nonce, &self.provider_id, cert_der);
		Ok(digests_match(&received, &expected))
	}
}

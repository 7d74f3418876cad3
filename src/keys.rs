//! Public key introspection and issuer-side signing.
//!
//! [`PublicKeyInfo`] carries the subjectPublicKeyInfo DER of a key along
//! with its family and effective bit size, which is what the signature
//! algorithm selection needs. [`IssuerKey`] wraps a private key of any
//! supported family and signs to-be-signed structures with it.

use rsa::pkcs8::EncodePublicKey;
use rsa::Pkcs1v15Sign;
use sha1::{Digest, Sha1};
use signature::hazmat::PrehashSigner;
use signature::DigestSigner;
use x509_parser::prelude::FromDer;
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::codec::{CertificateMaterial, PrivateKeyMaterial};
use crate::oid;
use crate::sig_algo::{HashAlg, KeyFamily, SignatureAlgorithm};
use crate::Error;

/// The public half of a key, as it appears in a certificate.
#[derive(Debug, Clone)]
pub struct PublicKeyInfo {
	spki_der: Vec<u8>,
	family: KeyFamily,
	bits: u32,
	curve_oid: Option<Vec<u64>>,
}

impl PublicKeyInfo {
	/// Parses a DER-encoded subjectPublicKeyInfo structure.
	pub fn from_der(spki: &[u8]) -> Result<Self, Error> {
		let (_, parsed) = SubjectPublicKeyInfo::from_der(spki)
			.map_err(|_| Error::CouldNotParseCertificate)?;
		let alg_oid = parsed
			.algorithm
			.algorithm
			.iter()
			.ok_or(Error::CouldNotParseCertificate)?
			.collect::<Vec<_>>();
		let (family, bits, curve_oid) = if alg_oid == oid::OID_RSA_ENCRYPTION {
			let modulus = match parsed
				.parsed()
				.map_err(|_| Error::CouldNotParseCertificate)?
			{
				x509_parser::public_key::PublicKey::RSA(rsa) => rsa.modulus.to_vec(),
				_ => return Err(Error::CouldNotParseCertificate),
			};
			(KeyFamily::Rsa, unsigned_bit_length(&modulus), None)
		} else if alg_oid == oid::OID_EC_PUBLIC_KEY {
			let params = parsed
				.algorithm
				.parameters
				.as_ref()
				.ok_or(Error::CouldNotParseCertificate)?;
			let curve = params
				.as_oid()
				.map_err(|_| Error::CouldNotParseCertificate)?;
			let curve = curve
				.iter()
				.ok_or(Error::CouldNotParseCertificate)?
				.collect::<Vec<_>>();
			let bits = if curve == oid::OID_EC_SECP_256_R1 {
				256
			} else if curve == oid::OID_EC_SECP_384_R1 {
				384
			} else if curve == oid::OID_EC_SECP_521_R1 {
				521
			} else {
				0
			};
			(KeyFamily::Ec, bits, Some(curve))
		} else if alg_oid == oid::OID_DSA {
			// Bit size of a DSA key is the bit length of the prime p, the
			// first INTEGER of the Dss-Parms parameters.
			let bits = parsed
				.algorithm
				.parameters
				.as_ref()
				.and_then(|params| first_integer_bit_length(params.data))
				.unwrap_or(0);
			(KeyFamily::Dsa, bits, None)
		} else {
			return Err(Error::UnsupportedSignatureAlgorithm);
		};
		Ok(Self {
			spki_der: spki.to_vec(),
			family,
			bits,
			curve_oid,
		})
	}

	/// The public key of an already decoded certificate.
	pub fn from_certificate(cert: &CertificateMaterial) -> Result<Self, Error> {
		Self::from_der(&cert.summary()?.spki_raw)
	}

	/// The raw subjectPublicKeyInfo encoding.
	pub fn spki_der(&self) -> &[u8] {
		&self.spki_der
	}
	/// The key family.
	pub fn family(&self) -> KeyFamily {
		self.family
	}
	/// The key size: modulus bits for RSA, field bits for EC, prime bits
	/// for DSA. Zero when the size could not be determined.
	pub fn bits(&self) -> u32 {
		self.bits
	}
	/// The named curve OID, for EC keys.
	pub fn curve_oid(&self) -> Option<&[u64]> {
		self.curve_oid.as_deref()
	}

	/// The contents of the subjectPublicKey BIT STRING. This is the input
	/// to the SHA-1 key identifier derivation.
	pub fn raw_key_bits(&self) -> Result<Vec<u8>, Error> {
		let (_, parsed) = SubjectPublicKeyInfo::from_der(&self.spki_der)
			.map_err(|_| Error::CouldNotParseCertificate)?;
		Ok(parsed.subject_public_key.data.to_vec())
	}

	/// The SHA-1 key identifier of this key, as used for the subject key
	/// identifier extension.
	pub fn key_identifier(&self) -> Result<Vec<u8>, Error> {
		Ok(Sha1::digest(self.raw_key_bits()?).to_vec())
	}
}

/// A private key an issuer signs certificates with.
pub enum IssuerKey {
	/// RSA key of any modulus size
	Rsa(rsa::RsaPrivateKey),
	/// ECDSA key on the P-256 curve
	EcP256(p256::ecdsa::SigningKey),
	/// ECDSA key on the P-384 curve
	EcP384(p384::ecdsa::SigningKey),
	/// DSA key
	Dsa(dsa::SigningKey),
}

impl IssuerKey {
	/// Wraps a key decoded from PEM.
	pub fn from_material(material: PrivateKeyMaterial) -> Self {
		match material {
			PrivateKeyMaterial::Rsa(key) => IssuerKey::Rsa(key),
			PrivateKeyMaterial::Dsa(key) => IssuerKey::Dsa(key),
		}
	}

	/// The public counterpart of this key.
	pub fn public_key_info(&self) -> Result<PublicKeyInfo, Error> {
		let doc = match self {
			IssuerKey::Rsa(key) => key.to_public_key().to_public_key_der(),
			IssuerKey::EcP256(key) => key.verifying_key().to_public_key_der(),
			IssuerKey::EcP384(key) => key.verifying_key().to_public_key_der(),
			IssuerKey::Dsa(key) => key.verifying_key().to_public_key_der(),
		}
		.map_err(|e| Error::CertificateGeneration(e.to_string()))?;
		PublicKeyInfo::from_der(doc.as_bytes())
	}

	pub(crate) fn family(&self) -> KeyFamily {
		match self {
			IssuerKey::Rsa(_) => KeyFamily::Rsa,
			IssuerKey::EcP256(_) | IssuerKey::EcP384(_) => KeyFamily::Ec,
			IssuerKey::Dsa(_) => KeyFamily::Dsa,
		}
	}

	/// Signs `message` with the given algorithm, returning the signature
	/// bytes as they go into the certificate BIT STRING.
	pub(crate) fn sign(
		&self,
		alg: &SignatureAlgorithm,
		message: &[u8],
	) -> Result<Vec<u8>, Error> {
		if alg.key_family() != self.family() {
			return Err(Error::UnsupportedSignatureAlgorithm);
		}
		let digest = alg.hash().digest(message);
		match self {
			IssuerKey::Rsa(key) => {
				let padding = match alg.hash() {
					HashAlg::Sha1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
					HashAlg::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
					HashAlg::Sha384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
					HashAlg::Sha512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
					HashAlg::Md5 => return Err(Error::UnsupportedSignatureAlgorithm),
				};
				key.sign(padding, &digest)
					.map_err(|e| Error::CertificateGeneration(e.to_string()))
			},
			IssuerKey::EcP256(key) => {
				let sig: p256::ecdsa::Signature = key
					.sign_prehash(&digest)
					.map_err(|e| Error::CertificateGeneration(e.to_string()))?;
				Ok(sig.to_der().as_bytes().to_vec())
			},
			IssuerKey::EcP384(key) => {
				let sig: p384::ecdsa::Signature = key
					.sign_prehash(&digest)
					.map_err(|e| Error::CertificateGeneration(e.to_string()))?;
				Ok(sig.to_der().as_bytes().to_vec())
			},
			IssuerKey::Dsa(key) => {
				let sig: dsa::Signature = match alg.hash() {
					HashAlg::Sha1 => key.try_sign_digest(Sha1::new_with_prefix(message)),
					HashAlg::Sha256 => {
						key.try_sign_digest(sha2::Sha256::new_with_prefix(message))
					},
					HashAlg::Sha384 => {
						key.try_sign_digest(sha2::Sha384::new_with_prefix(message))
					},
					HashAlg::Sha512 => {
						key.try_sign_digest(sha2::Sha512::new_with_prefix(message))
					},
					HashAlg::Md5 => return Err(Error::UnsupportedSignatureAlgorithm),
				}
				.map_err(|e| Error::CertificateGeneration(e.to_string()))?;
				// Dss-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }
				Ok(yasna::construct_der(|writer| {
					writer.write_sequence(|writer| {
						writer
							.next()
							.write_bigint_bytes(&sig.r().to_bytes_be(), true);
						writer
							.next()
							.write_bigint_bytes(&sig.s().to_bytes_be(), true);
					});
				}))
			},
		}
	}
}

/// Bit length of a big-endian unsigned integer, ignoring leading zeroes.
fn unsigned_bit_length(bytes: &[u8]) -> u32 {
	for (i, b) in bytes.iter().enumerate() {
		if *b != 0 {
			return (bytes.len() - i) as u32 * 8 - b.leading_zeros();
		}
	}
	0
}

/// Bit length of the first INTEGER in a run of DER values.
fn first_integer_bit_length(content: &[u8]) -> Option<u32> {
	if content.first() != Some(&0x02) {
		return None;
	}
	let rest = &content[1..];
	let first = *rest.first()?;
	let (len, header) = if first < 0x80 {
		(first as usize, 1)
	} else {
		let count = (first & 0x7f) as usize;
		if count == 0 || count > 4 || rest.len() < 1 + count {
			return None;
		}
		let mut len = 0usize;
		for b in &rest[1..1 + count] {
			len = len << 8 | *b as usize;
		}
		(len, 1 + count)
	};
	let value = rest.get(header..header + len)?;
	Some(unsigned_bit_length(value))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::rngs::OsRng;

	#[test]
	fn rsa_public_key_info_reports_modulus_bits() {
		let key = rsa::RsaPrivateKey::new(&mut OsRng, 512).unwrap();
		let info = IssuerKey::Rsa(key).public_key_info().unwrap();
		assert_eq!(info.family(), KeyFamily::Rsa);
		assert_eq!(info.bits(), 512);
		assert!(info.curve_oid().is_none());
	}

	#[test]
	fn ec_public_key_info_reports_field_bits() {
		let key = p256::ecdsa::SigningKey::random(&mut OsRng);
		let info = IssuerKey::EcP256(key).public_key_info().unwrap();
		assert_eq!(info.family(), KeyFamily::Ec);
		assert_eq!(info.bits(), 256);
		assert_eq!(info.curve_oid(), Some(&crate::oid::OID_EC_SECP_256_R1[..]));

		let key = p384::ecdsa::SigningKey::random(&mut OsRng);
		let info = IssuerKey::EcP384(key).public_key_info().unwrap();
		assert_eq!(info.bits(), 384);
	}

	#[test]
	fn key_identifier_is_sha1_of_key_bits() {
		let key = p256::ecdsa::SigningKey::random(&mut OsRng);
		let info = IssuerKey::EcP256(key).public_key_info().unwrap();
		let ski = info.key_identifier().unwrap();
		assert_eq!(ski.len(), 20);
		assert_eq!(ski, Sha1::digest(info.raw_key_bits().unwrap()).to_vec());
	}

	#[test]
	fn signing_with_mismatched_family_is_rejected() {
		let key = p256::ecdsa::SigningKey::random(&mut OsRng);
		let err = IssuerKey::EcP256(key)
			.sign(&crate::sig_algo::SHA256_WITH_RSA, b"tbs")
			.unwrap_err();
		assert_eq!(err, Error::UnsupportedSignatureAlgorithm);
	}

	#[test]
	fn bit_length_ignores_leading_zeroes() {
		assert_eq!(unsigned_bit_length(&[0x00, 0x80, 0x00]), 16);
		assert_eq!(unsigned_bit_length(&[0x01]), 1);
		assert_eq!(unsigned_bit_length(&[0x00, 0x00]), 0);
	}
}

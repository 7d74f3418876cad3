use pem::Pem;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use sha2::{Digest, Sha256};
use signature::{DigestSigner, DigestVerifier};
use yasna::models::ObjectIdentifier;

use certforge::{
	decode_certificate_chain, decode_csr, decode_private_key_from_pem, generate, CertGenParams,
	Error, IssuerKey, PrivateKeyMaterial,
};

fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}

fn rsa_issuer(bits: usize) -> IssuerKey {
	IssuerKey::Rsa(rsa::RsaPrivateKey::new(&mut OsRng, bits).unwrap())
}

fn self_signed(subject: &str, issuer: &IssuerKey) -> certforge::CertificateMaterial {
	let params = CertGenParams::new(subject);
	generate(&params, &issuer.public_key_info().unwrap(), issuer, None).unwrap()
}

#[test]
fn chain_of_pem_blocks_decodes_in_order() {
	init_logging();
	let issuer = rsa_issuer(512);
	let first = self_signed("cn=first", &issuer);
	let second = self_signed("cn=second", &issuer);

	let concatenated = format!("{}{}", first.to_pem(), second.to_pem());
	let chain = decode_certificate_chain(concatenated.as_bytes()).unwrap();
	assert_eq!(chain.len(), 2);
	assert_eq!(chain[0].der(), first.der());
	assert_eq!(chain[1].der(), second.der());
	assert_eq!(chain[0].summary().unwrap().subject, "CN=first");
	assert_eq!(chain[1].summary().unwrap().subject, "CN=second");
}

#[test]
fn chain_of_concatenated_der_decodes_in_order() {
	init_logging();
	let issuer = rsa_issuer(512);
	let first = self_signed("cn=first", &issuer);
	let second = self_signed("cn=second", &issuer);

	let mut concatenated = first.der().to_vec();
	concatenated.extend_from_slice(second.der());
	let chain = decode_certificate_chain(&concatenated).unwrap();
	assert_eq!(chain.len(), 2);
	assert_eq!(chain[0].der(), first.der());
	assert_eq!(chain[1].der(), second.der());
}

#[test]
fn chain_with_foreign_pem_block_is_rejected() {
	init_logging();
	let issuer = rsa_issuer(512);
	let cert = self_signed("cn=only", &issuer);
	let foreign = pem::encode(&Pem::new("PUBLIC KEY", vec![1, 2, 3]));
	let concatenated = format!("{}{}", cert.to_pem(), foreign);
	assert_eq!(
		decode_certificate_chain(concatenated.as_bytes()).unwrap_err(),
		Error::ChainEntryNotACertificate
	);
}

/// Builds a signed PKCS#10 request for the issuer's own key.
fn build_csr(issuer_key: &rsa::RsaPrivateKey, spki: &[u8], common_name: &str) -> Vec<u8> {
	let info = yasna::construct_der(|writer| {
		writer.write_sequence(|writer| {
			writer.next().write_u8(0);
			writer.next().write_sequence(|writer| {
				writer.next().write_set(|writer| {
					writer.next().write_sequence(|writer| {
						writer
							.next()
							.write_oid(&ObjectIdentifier::from_slice(&[2, 5, 4, 3]));
						writer.next().write_utf8_string(common_name);
					});
				});
			});
			writer.next().write_der(spki);
			// attributes [0]
			writer
				.next()
				.write_tagged_implicit(yasna::Tag::context(0), |writer| {
					writer.write_set_of(|_| {});
				});
		});
	});
	let digest = Sha256::digest(&info);
	let signature = issuer_key
		.sign(rsa::Pkcs1v15Sign::new::<Sha256>(), &digest)
		.unwrap();
	yasna::construct_der(|writer| {
		writer.write_sequence(|writer| {
			writer.next().write_der(&info);
			writer.next().write_sequence(|writer| {
				writer.next().write_oid(&ObjectIdentifier::from_slice(&[
					1, 2, 840, 113549, 1, 1, 11,
				]));
				writer.next().write_null();
			});
			writer
				.next()
				.write_bitvec_bytes(&signature, signature.len() * 8);
		});
	})
}

#[test]
fn csr_decodes_from_der_and_both_pem_marker_variants() {
	init_logging();
	let key = rsa::RsaPrivateKey::new(&mut OsRng, 512).unwrap();
	let issuer = IssuerKey::Rsa(key.clone());
	let spki = issuer.public_key_info().unwrap().spki_der().to_vec();
	let der = build_csr(&key, &spki, "csr test");

	let csr = decode_csr(&der).unwrap();
	assert_eq!(csr.subject().unwrap(), "CN=csr test");
	assert_eq!(csr.public_key_der().unwrap(), spki);

	let pem_text = pem::encode(&Pem::new("CERTIFICATE REQUEST", der.clone()));
	let csr = decode_csr(pem_text.as_bytes()).unwrap();
	assert_eq!(csr.der(), der.as_slice());

	let new_variant = pem_text.replace("CERTIFICATE REQUEST", "NEW CERTIFICATE REQUEST");
	let csr = decode_csr(new_variant.as_bytes()).unwrap();
	assert_eq!(csr.der(), der.as_slice());

	assert_eq!(
		decode_csr(b"not a request").unwrap_err(),
		Error::CouldNotParseCertificationRequest
	);
}

#[test]
fn rsa_private_key_pem_round_trips() {
	init_logging();
	let key = rsa::RsaPrivateKey::new(&mut OsRng, 512).unwrap();
	let pem_text = key.to_pkcs1_pem(LineEnding::LF).unwrap();

	let decoded = match decode_private_key_from_pem(&pem_text).unwrap() {
		PrivateKeyMaterial::Rsa(decoded) => decoded,
		PrivateKeyMaterial::Dsa(_) => panic!("RSA marker decoded as DSA"),
	};
	assert_eq!(decoded.n(), key.n());
	assert_eq!(decoded.e(), key.e());
}

#[test]
fn dsa_private_key_pem_decodes_to_a_working_key() {
	init_logging();
	let components = dsa::Components::generate(&mut OsRng, dsa::KeySize::DSA_1024_160);
	// a 152-bit exponent is always below the 160-bit q
	let mut x_bytes = [0u8; 19];
	OsRng.fill_bytes(&mut x_bytes);
	x_bytes[18] |= 1;
	let x = num_bigint_dig::BigUint::from_bytes_be(&x_bytes);
	let y = components.g().modpow(&x, components.p());

	let der = yasna::construct_der(|writer| {
		writer.write_sequence(|writer| {
			writer.next().write_u8(0);
			for value in [components.p(), components.q(), components.g(), &y, &x] {
				writer.next().write_bigint_bytes(&value.to_bytes_be(), true);
			}
		});
	});
	let pem_text = pem::encode(&Pem::new("DSA PRIVATE KEY", der));

	let decoded = match decode_private_key_from_pem(&pem_text).unwrap() {
		PrivateKeyMaterial::Dsa(decoded) => decoded,
		PrivateKeyMaterial::Rsa(_) => panic!("DSA marker decoded as RSA"),
	};

	let verifier = dsa::VerifyingKey::from_components(components, y).unwrap();
	let signature: dsa::Signature = decoded
		.try_sign_digest(Sha256::new_with_prefix(b"possession proof"))
		.unwrap();
	verifier
		.verify_digest(Sha256::new_with_prefix(b"possession proof"), &signature)
		.unwrap();
}

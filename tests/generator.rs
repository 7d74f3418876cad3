use rand::rngs::OsRng;
use time::Duration;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::prelude::{FromDer, X509Certificate};

use certforge::codec::decode_cert_bytes_from_pem;
use certforge::{
	days_until_expiry, decode_certificate, expiry_severity, generate, CertGenParams,
	ExpirySeverity, HashAlg, IssuerKey, KeyUsage, X509GeneralName,
};

fn rsa_issuer(bits: usize) -> IssuerKey {
	IssuerKey::Rsa(rsa::RsaPrivateKey::new(&mut OsRng, bits).unwrap())
}

fn parse(der: &[u8]) -> X509Certificate<'_> {
	X509Certificate::from_der(der).unwrap().1
}

#[test]
fn ca_certificate_carries_expected_constraints() {
	let issuer = rsa_issuer(2048);
	let params = CertGenParams::ca_certificate("cn=test", 365);
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();

	let x509 = parse(cert.der());
	assert_eq!(x509.version().0, 2, "expected an X.509 v3 certificate");

	let mut saw_basic_constraints = false;
	let mut saw_key_usage = false;
	for ext in x509.iter_extensions() {
		match ext.parsed_extension() {
			ParsedExtension::BasicConstraints(bc) => {
				saw_basic_constraints = true;
				assert!(ext.critical, "basic constraints must be critical");
				assert!(bc.ca);
				assert_eq!(bc.path_len_constraint, Some(1));
			},
			ParsedExtension::KeyUsage(ku) => {
				saw_key_usage = true;
				assert!(ku.key_cert_sign());
				assert!(ku.crl_sign());
				assert!(!ku.digital_signature());
			},
			_ => {},
		}
	}
	assert!(saw_basic_constraints);
	assert!(saw_key_usage);

	let not_before = x509.validity().not_before.to_datetime();
	let not_after = x509.validity().not_after.to_datetime();
	let window = not_after - not_before;
	assert!((window - Duration::days(365)).abs() < Duration::hours(1));
}

#[test]
fn short_rsa_key_downgrades_to_sha1() {
	let issuer = rsa_issuer(512);
	let mut params = CertGenParams::new("cn=short");
	params.hash_hint = Some(HashAlg::Sha384);
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();

	let x509 = parse(cert.der());
	// sha1WithRSAEncryption, not sha384WithRSAEncryption
	assert_eq!(
		x509.signature_algorithm.algorithm.to_id_string(),
		"1.2.840.113549.1.1.5"
	);
}

#[test]
fn adequate_rsa_key_defaults_to_sha384() {
	let issuer = rsa_issuer(2048);
	let params = CertGenParams::new("cn=strong");
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();

	let x509 = parse(cert.der());
	assert_eq!(
		x509.signature_algorithm.algorithm.to_id_string(),
		"1.2.840.113549.1.1.12"
	);
}

#[test]
fn p256_issuer_is_a_short_key_and_gets_sha1_ecdsa() {
	let issuer = IssuerKey::EcP256(p256::ecdsa::SigningKey::random(&mut OsRng));
	let params = CertGenParams::new("cn=ec short");
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();
	assert_eq!(
		parse(cert.der()).signature_algorithm.algorithm.to_id_string(),
		"1.2.840.10045.4.1"
	);
}

#[test]
fn p384_issuer_defaults_to_sha384_ecdsa() {
	let issuer = IssuerKey::EcP384(p384::ecdsa::SigningKey::random(&mut OsRng));
	let params = CertGenParams::new("cn=ec strong");
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();
	assert_eq!(
		parse(cert.der()).signature_algorithm.algorithm.to_id_string(),
		"1.2.840.10045.4.3.3"
	);
}

#[test]
fn generated_certificate_survives_pem_round_trip() {
	let issuer = rsa_issuer(512);
	let params = CertGenParams::new("cn=round trip");
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();

	let pem = cert.to_pem();
	let recovered = decode_cert_bytes_from_pem(&pem, true).unwrap();
	assert_eq!(recovered, cert.der());

	let decoded = decode_certificate(pem.as_bytes()).unwrap();
	assert_eq!(decoded.der(), cert.der());
	assert_eq!(decoded.summary().unwrap().subject, "CN=round trip");
}

#[test]
fn subject_alt_names_are_typed_by_host_string() {
	let issuer = rsa_issuer(512);
	let mut params = CertGenParams::new("cn=san test");
	params.subject_alt_names = vec![
		X509GeneralName::from_host_or_ip("gw.example.com"),
		X509GeneralName::from_host_or_ip("192.0.2.17"),
		X509GeneralName::Rfc822Name("admin@example.com".to_string()),
		X509GeneralName::Uri("https://example.com/ca".to_string()),
	];
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();

	let x509 = parse(cert.der());
	let san = x509
		.iter_extensions()
		.find_map(|ext| match ext.parsed_extension() {
			ParsedExtension::SubjectAlternativeName(san) => Some(san),
			_ => None,
		})
		.expect("SAN extension missing");
	assert_eq!(san.general_names.len(), 4);
	assert!(san
		.general_names
		.iter()
		.any(|name| matches!(name, GeneralName::DNSName(s) if *s == "gw.example.com")));
	assert!(san
		.general_names
		.iter()
		.any(|name| matches!(name, GeneralName::IPAddress(b) if *b == [192, 0, 2, 17])));
	assert!(san
		.general_names
		.iter()
		.any(|name| matches!(name, GeneralName::RFC822Name(s) if *s == "admin@example.com")));
	assert!(san
		.general_names
		.iter()
		.any(|name| matches!(name, GeneralName::URI(s) if *s == "https://example.com/ca")));
}

#[test]
fn issued_certificate_links_back_to_its_ca() {
	let ca_key = rsa_issuer(2048);
	let ca_params = CertGenParams::ca_certificate("cn=Test CA,o=Example", 3650);
	let ca_cert =
		generate(&ca_params, &ca_key.public_key_info().unwrap(), &ca_key, None).unwrap();
	let ca_ski = ca_cert.summary().unwrap().ski.clone().expect("CA must carry a SKI");

	let leaf_key = rsa_issuer(512);
	let mut leaf_params = CertGenParams::new("cn=leaf,o=Example");
	leaf_params.include_authority_key_identifier = true;
	leaf_params.key_usages = vec![KeyUsage::DigitalSignature, KeyUsage::KeyEncipherment];
	let leaf = generate(
		&leaf_params,
		&leaf_key.public_key_info().unwrap(),
		&ca_key,
		Some(&ca_cert),
	)
	.unwrap();

	let leaf_summary = leaf.summary().unwrap();
	let ca_summary = ca_cert.summary().unwrap();
	assert_eq!(leaf_summary.issuer, ca_summary.subject);

	let x509 = parse(leaf.der());
	let aki = x509
		.iter_extensions()
		.find_map(|ext| match ext.parsed_extension() {
			ParsedExtension::AuthorityKeyIdentifier(aki) => Some(aki),
			_ => None,
		})
		.expect("AKI extension missing");
	assert_eq!(aki.key_identifier.as_ref().unwrap().0, ca_ski.as_slice());
}

#[test]
fn extension_urls_round_trip_through_properties() {
	let issuer = rsa_issuer(512);
	let mut params = CertGenParams::new("cn=urls");
	params.ocsp_urls = vec!["http://ocsp.example.com".to_string()];
	params.crl_distribution_points = vec![certforge::CrlDistributionPoint {
		uris: vec!["http://crl.example.com/gateway.crl".to_string()],
	}];
	params.netscape_crl_url = Some("http://crl.example.com/legacy.crl".to_string());
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();

	let rows = certforge::properties(&cert, false).unwrap();
	let value_of = |label: &str| -> &str {
		rows.iter()
			.find(|(l, _)| l == label)
			.map(|(_, v)| v.as_str())
			.unwrap_or_else(|| panic!("missing row {label}"))
	};
	assert_eq!(value_of("OCSP URLs"), "http://ocsp.example.com");
	assert_eq!(value_of("CRL URLs"), "http://crl.example.com/gateway.crl");
	assert_eq!(value_of("Netscape CRL URL"), "http://crl.example.com/legacy.crl");
	assert_eq!(value_of("Signature algorithm"), "SHA1withRSA");
}

#[test]
fn explicit_validity_window_is_respected() {
	let issuer = rsa_issuer(512);
	let mut params = CertGenParams::new("cn=window");
	let not_before = time::macros::datetime!(2024-01-01 00:00:00 UTC);
	let not_after = time::macros::datetime!(2034-01-01 00:00:00 UTC);
	params.not_before = Some(not_before);
	params.not_after = Some(not_after);
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();

	let x509 = parse(cert.der());
	assert_eq!(x509.validity().not_before.to_datetime(), not_before);
	assert_eq!(x509.validity().not_after.to_datetime(), not_after);
}

#[test]
fn remaining_days_truncate_toward_zero() {
	let _ = env_logger::builder().is_test(true).try_init();
	let issuer = rsa_issuer(512);
	let now = time::OffsetDateTime::now_utc();

	// 23 hours left is still day zero, and severe
	let mut params = CertGenParams::new("cn=almost expired");
	params.not_before = Some(now - Duration::hours(1));
	params.not_after = Some(now + Duration::hours(23));
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();
	assert_eq!(days_until_expiry(&cert).unwrap(), 0);
	assert_eq!(expiry_severity(&cert).unwrap(), ExpirySeverity::Severe);

	let mut params = CertGenParams::new("cn=ten days");
	params.not_before = Some(now - Duration::hours(1));
	params.not_after = Some(now + Duration::hours(10 * 24 + 12));
	let cert = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap();
	assert_eq!(days_until_expiry(&cert).unwrap(), 10);
	assert_eq!(expiry_severity(&cert).unwrap(), ExpirySeverity::Info);
}

#[test]
fn inverted_validity_window_is_rejected() {
	let issuer = rsa_issuer(512);
	let mut params = CertGenParams::new("cn=backwards");
	params.not_before = Some(time::macros::datetime!(2034-01-01 00:00:00 UTC));
	params.not_after = Some(time::macros::datetime!(2024-01-01 00:00:00 UTC));
	let err = generate(&params, &issuer.public_key_info().unwrap(), &issuer, None).unwrap_err();
	assert_eq!(err, certforge::Error::InvalidValidityPeriod);
}

//! Human- and machine-readable certificate properties.
//!
//! Fingerprints, expiry banding and the ordered property-row listing used
//! for display. A single undecodable extension never aborts the listing;
//! its row degrades to a placeholder and the failure is logged.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use log::warn;
use time::OffsetDateTime;
use x509_parser::extensions::{DistributionPointName, GeneralName, ParsedExtension};
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::codec::CertificateMaterial;
use crate::keys::PublicKeyInfo;
use crate::oid::{self, oid_to_string};
use crate::sig_algo::{HashAlg, KeyFamily, SignatureAlgorithm};
use crate::Error;

/// Row value substituted when one extension cannot be decoded.
const UNDECODABLE: &str = "(undecodable extension)";

/// Names of the KeyUsage bits, in bit order.
pub const KEY_USAGE_NAMES: [&str; 9] = [
	"digitalSignature",
	"nonRepudiation",
	"keyEncipherment",
	"dataEncipherment",
	"keyAgreement",
	"keyCertSign",
	"cRLSign",
	"encipherOnly",
	"decipherOnly",
];

/// Known extended key usage OIDs and their display names.
pub const EXT_KEY_USAGE_NAMES: &[(&[u64], &str)] = &[
	(oid::OID_EKU_ANY, "anyExtendedKeyUsage"),
	(oid::OID_EKU_SERVER_AUTH, "serverAuth"),
	(oid::OID_EKU_CLIENT_AUTH, "clientAuth"),
	(oid::OID_EKU_CODE_SIGNING, "codeSigning"),
	(oid::OID_EKU_EMAIL_PROTECTION, "emailProtection"),
	(oid::OID_EKU_TIME_STAMPING, "timeStamping"),
	(oid::OID_EKU_OCSP_SIGNING, "OCSPSigning"),
];

/// Output form of a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintFormat {
	/// Algorithm-prefixed, upper-case, colon-delimited: `SHA1:AB:CD:...`
	Hex,
	/// Upper-case hex with no prefix and no separators
	RawHex,
	/// Standard base64 of the raw digest
	Base64,
}

/// Digest of the DER encoding, rendered in the requested format.
pub fn fingerprint(der: &[u8], alg: HashAlg, format: FingerprintFormat) -> String {
	let digest = alg.digest(der);
	match format {
		FingerprintFormat::Hex => {
			let mut out = alg.name().to_string();
			for byte in &digest {
				out.push(':');
				out.push_str(&format!("{byte:02X}"));
			}
			out
		},
		FingerprintFormat::RawHex => hex::encode_upper(&digest),
		FingerprintFormat::Base64 => BASE64_STANDARD.encode(&digest),
	}
}

/// How urgently an expiry date deserves attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySeverity {
	/// Two days or less
	Severe,
	/// A week or less
	Warning,
	/// Two weeks or less
	Info,
	/// A month or less
	Fine,
	/// More than a month away
	Ordinary,
}

impl ExpirySeverity {
	/// The band for a remaining-day count.
	pub fn from_days(days: i64) -> Self {
		if days <= 2 {
			ExpirySeverity::Severe
		} else if days <= 7 {
			ExpirySeverity::Warning
		} else if days <= 14 {
			ExpirySeverity::Info
		} else if days <= 30 {
			ExpirySeverity::Fine
		} else {
			ExpirySeverity::Ordinary
		}
	}
}

/// Whole days until the certificate expires, truncated toward zero.
///
/// A certificate expiring in 23 hours reports 0 days. Downstream severity
/// banding relies on the truncation, so this must not round.
pub fn days_until_expiry(cert: &CertificateMaterial) -> Result<i64, Error> {
	let not_after = cert.summary()?.not_after;
	Ok((not_after - OffsetDateTime::now_utc()).whole_days())
}

/// Severity band for the certificate's remaining lifetime.
pub fn expiry_severity(cert: &CertificateMaterial) -> Result<ExpirySeverity, Error> {
	Ok(ExpirySeverity::from_days(days_until_expiry(cert)?))
}

/// Assembles the ordered display properties of a certificate.
///
/// Row order is fixed and preserved across calls so output can be diffed.
/// When `include_key_info` is set, key-type specific rows (RSA modulus and
/// exponent, EC curve) are added. The EC curve name is only reported when
/// the parser exposes the curve OID structurally; certificates with
/// explicit curve parameters simply omit the row.
pub fn properties(
	cert: &CertificateMaterial,
	include_key_info: bool,
) -> Result<Vec<(String, String)>, Error> {
	let x509 = cert.parse()?;
	let summary = cert.summary()?;

	let mut basic_constraints = None;
	let mut key_usage = None;
	let mut ext_key_usage = None;
	let mut subject_alt_names = None;
	let mut ocsp_urls = None;
	let mut crl_urls = None;
	let mut netscape_crl_url = None;
	for ext in x509.iter_extensions() {
		if oid_matches(&ext.oid, oid::OID_BASIC_CONSTRAINTS) {
			basic_constraints = Some(match ext.parsed_extension() {
				ParsedExtension::BasicConstraints(bc) => {
					let mut value = format!("CA: {}", bc.ca);
					if let Some(len) = bc.path_len_constraint {
						value.push_str(&format!(", path length: {len}"));
					}
					value
				},
				_ => undecodable("basic constraints"),
			});
		} else if oid_matches(&ext.oid, oid::OID_KEY_USAGE) {
			key_usage = Some(match ext.parsed_extension() {
				ParsedExtension::KeyUsage(ku) => {
					let names: Vec<&str> = KEY_USAGE_NAMES
						.iter()
						.enumerate()
						.filter(|(bit, _)| ku.flags & (1 << bit) != 0)
						.map(|(_, name)| *name)
						.collect();
					names.join(", ")
				},
				_ => undecodable("key usage"),
			});
		} else if oid_matches(&ext.oid, oid::OID_EXT_KEY_USAGE) {
			ext_key_usage = Some(match ext.parsed_extension() {
				ParsedExtension::ExtendedKeyUsage(_) => {
					// names resolved from the raw OID list to keep unknown
					// purposes visible in dotted form
					match decode_eku_names(ext.value) {
						Some(names) => names.join(", "),
						None => undecodable("extended key usage"),
					}
				},
				_ => undecodable("extended key usage"),
			});
		} else if oid_matches(&ext.oid, oid::OID_SUBJECT_ALT_NAME) {
			subject_alt_names = Some(match ext.parsed_extension() {
				ParsedExtension::SubjectAlternativeName(san) => san
					.general_names
					.iter()
					.map(general_name_to_string)
					.collect::<Vec<_>>()
					.join(", "),
				_ => undecodable("subject alternative name"),
			});
		} else if oid_matches(&ext.oid, oid::OID_AUTHORITY_INFO_ACCESS) {
			ocsp_urls = Some(match ext.parsed_extension() {
				ParsedExtension::AuthorityInfoAccess(aia) => aia
					.accessdescs
					.iter()
					.filter(|desc| oid_matches(&desc.access_method, oid::OID_AD_OCSP))
					.filter_map(|desc| match &desc.access_location {
						GeneralName::URI(uri) => Some(uri.to_string()),
						_ => None,
					})
					.collect::<Vec<_>>()
					.join(", "),
				_ => undecodable("authority info access"),
			});
		} else if oid_matches(&ext.oid, oid::OID_CRL_DISTRIBUTION_POINTS) {
			crl_urls = Some(match ext.parsed_extension() {
				ParsedExtension::CRLDistributionPoints(points) => points
					.iter()
					.filter_map(|point| point.distribution_point.as_ref())
					.filter_map(|name| match name {
						DistributionPointName::FullName(names) => Some(names),
						_ => None,
					})
					.flatten()
					.filter_map(|name| match name {
						GeneralName::URI(uri) => Some(uri.to_string()),
						_ => None,
					})
					.collect::<Vec<_>>()
					.join(", "),
				_ => undecodable("CRL distribution points"),
			});
		} else if oid_matches(&ext.oid, oid::OID_NETSCAPE_CRL_URL) {
			netscape_crl_url = Some(match decode_ia5_string(ext.value) {
				Some(url) => url,
				None => undecodable("Netscape CRL URL"),
			});
		}
	}

	let mut rows = Vec::new();
	rows.push(("Not valid before".to_string(), summary.not_before.to_string()));
	rows.push(("Not valid after".to_string(), summary.not_after.to_string()));
	rows.push(("Subject".to_string(), summary.subject.clone()));
	rows.push(("Issuer".to_string(), summary.issuer.clone()));
	rows.push(("Serial number".to_string(), summary.serial_hex.clone()));
	rows.push((
		"SHA-1 fingerprint".to_string(),
		fingerprint(cert.der(), HashAlg::Sha1, FingerprintFormat::Hex),
	));
	rows.push((
		"MD5 fingerprint".to_string(),
		fingerprint(cert.der(), HashAlg::Md5, FingerprintFormat::Hex),
	));
	if let Some(value) = basic_constraints {
		rows.push(("Basic constraints".to_string(), value));
	}
	if let Some(value) = key_usage {
		rows.push(("Key usage".to_string(), value));
	}
	if let Some(value) = ext_key_usage {
		rows.push(("Extended key usage".to_string(), value));
	}
	rows.push((
		"Signature algorithm".to_string(),
		signature_algorithm_name(&x509),
	));
	if include_key_info {
		append_key_info_rows(&mut rows, summary.spki_raw.as_slice());
	}
	if let Some(value) = ocsp_urls {
		rows.push(("OCSP URLs".to_string(), value));
	}
	if let Some(value) = crl_urls {
		rows.push(("CRL URLs".to_string(), value));
	}
	if let Some(value) = netscape_crl_url {
		rows.push(("Netscape CRL URL".to_string(), value));
	}
	if let Some(value) = subject_alt_names {
		rows.push(("Subject alternative names".to_string(), value));
	}
	Ok(rows)
}

fn undecodable(what: &str) -> String {
	warn!("could not decode {what} extension, substituting placeholder");
	UNDECODABLE.to_string()
}

fn signature_algorithm_name(x509: &X509Certificate<'_>) -> String {
	let components: Option<Vec<u64>> = x509
		.signature_algorithm
		.algorithm
		.iter()
		.map(|iter| iter.collect());
	match components {
		Some(components) => match SignatureAlgorithm::from_oid(&components) {
			Ok(alg) => alg.name().to_string(),
			Err(_) => oid_to_string(&components),
		},
		None => x509.signature_algorithm.algorithm.to_string(),
	}
}

fn append_key_info_rows(rows: &mut Vec<(String, String)>, spki: &[u8]) {
	let info = match PublicKeyInfo::from_der(spki) {
		Ok(info) => info,
		Err(_) => {
			warn!("could not decode subject public key info");
			rows.push(("Public key".to_string(), UNDECODABLE.to_string()));
			return;
		},
	};
	match info.family() {
		KeyFamily::Rsa => {
			rows.push(("Public key type".to_string(), "RSA".to_string()));
			rows.push(("Key strength".to_string(), format!("{} bit", info.bits())));
			if let Some((modulus, exponent)) = rsa_key_parameters(spki) {
				rows.push(("Modulus".to_string(), modulus));
				rows.push(("Public exponent".to_string(), exponent));
			}
		},
		KeyFamily::Ec => {
			rows.push(("Public key type".to_string(), "EC".to_string()));
			rows.push(("Key strength".to_string(), format!("{} bit", info.bits())));
			if let Some(name) = info.curve_oid().and_then(curve_name) {
				rows.push(("Curve".to_string(), name.to_string()));
			}
		},
		KeyFamily::Dsa => {
			rows.push(("Public key type".to_string(), "DSA".to_string()));
			rows.push(("Key strength".to_string(), format!("{} bit", info.bits())));
		},
	}
}

/// Modulus as upper-case hex and public exponent as a decimal string.
fn rsa_key_parameters(spki: &[u8]) -> Option<(String, String)> {
	use x509_parser::x509::SubjectPublicKeyInfo;
	let (_, parsed) = SubjectPublicKeyInfo::from_der(spki).ok()?;
	let rsa = match parsed.parsed().ok()? {
		x509_parser::public_key::PublicKey::RSA(rsa) => rsa,
		_ => return None,
	};
	let modulus = rsa.modulus;
	// the DER integer may carry a leading zero octet
	let modulus = match modulus.first() {
		Some(0) => &modulus[1..],
		_ => modulus,
	};
	let exponent_bytes = match rsa.exponent.iter().position(|byte| *byte != 0) {
		Some(first) => &rsa.exponent[first..],
		None => &[0][..],
	};
	// oversized exponents cannot be narrowed to u64, render them as hex
	let exponent = if exponent_bytes.len() <= 8 {
		exponent_bytes
			.iter()
			.fold(0u64, |acc, byte| acc << 8 | u64::from(*byte))
			.to_string()
	} else {
		format!("0x{}", hex::encode_upper(exponent_bytes))
	};
	Some((hex::encode_upper(modulus), exponent))
}

fn curve_name(curve: &[u64]) -> Option<&'static str> {
	if curve == oid::OID_EC_SECP_256_R1 {
		Some("prime256v1")
	} else if curve == oid::OID_EC_SECP_384_R1 {
		Some("secp384r1")
	} else if curve == oid::OID_EC_SECP_521_R1 {
		Some("secp521r1")
	} else {
		None
	}
}

fn general_name_to_string(name: &GeneralName<'_>) -> String {
	match name {
		GeneralName::DNSName(s) => format!("DNS:{s}"),
		GeneralName::RFC822Name(s) => format!("email:{s}"),
		GeneralName::URI(s) => format!("URI:{s}"),
		GeneralName::IPAddress(bytes) => match bytes.len() {
			4 => format!("IP:{}.{}.{}.{}", bytes[0], bytes[1], bytes[2], bytes[3]),
			16 => {
				let mut segments = Vec::with_capacity(8);
				for pair in bytes.chunks(2) {
					segments.push(format!("{:x}", u16::from_be_bytes([pair[0], pair[1]])));
				}
				format!("IP:{}", segments.join(":"))
			},
			_ => "IP:(malformed)".to_string(),
		},
		GeneralName::DirectoryName(dn) => format!("DirName:{dn}"),
		GeneralName::RegisteredID(oid) => format!("RID:{oid}"),
		GeneralName::OtherName(oid, _) => format!("otherName:{oid}"),
		_ => "(unsupported name type)".to_string(),
	}
}

/// Reads the EXtendedKeyUsage OID list directly from the extension value.
fn decode_eku_names(value: &[u8]) -> Option<Vec<String>> {
	let oids: Vec<Vec<u64>> = yasna::parse_der(value, |reader| {
		reader.collect_sequence_of(|reader| Ok(reader.read_oid()?.components().clone()))
	})
	.ok()?;
	Some(
		oids.iter()
			.map(|components| {
				EXT_KEY_USAGE_NAMES
					.iter()
					.find(|(known, _)| *known == components.as_slice())
					.map(|(_, name)| name.to_string())
					.unwrap_or_else(|| oid_to_string(components))
			})
			.collect(),
	)
}

fn decode_ia5_string(value: &[u8]) -> Option<String> {
	yasna::parse_der(value, |reader| reader.read_ia5_string()).ok()
}

fn oid_matches(oid: &x509_parser::der_parser::Oid<'_>, components: &[u64]) -> bool {
	match oid.iter() {
		Some(iter) => iter.eq(components.iter().copied()),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// MD5("abc") = 900150983cd24fb0d6963f7d28e17f72
	// SHA1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d

	#[test]
	fn hex_fingerprint_is_prefixed_and_colon_delimited() {
		let fp = fingerprint(b"abc", HashAlg::Md5, FingerprintFormat::Hex);
		assert_eq!(
			fp,
			"MD5:90:01:50:98:3C:D2:4F:B0:D6:96:3F:7D:28:E1:7F:72"
		);
		let fp = fingerprint(b"abc", HashAlg::Sha1, FingerprintFormat::Hex);
		assert!(fp.starts_with("SHA1:A9:99:3E:36"));
	}

	#[test]
	fn rawhex_fingerprint_has_no_separators() {
		let fp = fingerprint(b"abc", HashAlg::Md5, FingerprintFormat::RawHex);
		assert_eq!(fp, "900150983CD24FB0D6963F7D28E17F72");
	}

	#[test]
	fn base64_fingerprint_encodes_raw_digest() {
		let fp = fingerprint(b"abc", HashAlg::Sha1, FingerprintFormat::Base64);
		assert_eq!(fp, "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
	}

	#[test]
	fn severity_banding_boundaries() {
		assert_eq!(ExpirySeverity::from_days(-1), ExpirySeverity::Severe);
		assert_eq!(ExpirySeverity::from_days(0), ExpirySeverity::Severe);
		assert_eq!(ExpirySeverity::from_days(2), ExpirySeverity::Severe);
		assert_eq!(ExpirySeverity::from_days(3), ExpirySeverity::Warning);
		assert_eq!(ExpirySeverity::from_days(7), ExpirySeverity::Warning);
		assert_eq!(ExpirySeverity::from_days(8), ExpirySeverity::Info);
		assert_eq!(ExpirySeverity::from_days(14), ExpirySeverity::Info);
		assert_eq!(ExpirySeverity::from_days(15), ExpirySeverity::Fine);
		assert_eq!(ExpirySeverity::from_days(30), ExpirySeverity::Fine);
		assert_eq!(ExpirySeverity::from_days(31), ExpirySeverity::Ordinary);
	}

	#[test]
	fn oversized_rsa_exponent_is_rendered_as_hex() {
		use yasna::models::ObjectIdentifier;
		let rsa_key = |exponent: &[u8]| {
			let key = yasna::construct_der(|writer| {
				writer.write_sequence(|writer| {
					writer.next().write_bigint_bytes(&[0x03; 64], true);
					writer.next().write_bigint_bytes(exponent, true);
				});
			});
			yasna::construct_der(|writer| {
				writer.write_sequence(|writer| {
					writer.next().write_sequence(|writer| {
						writer.next().write_oid(&ObjectIdentifier::from_slice(
							crate::oid::OID_RSA_ENCRYPTION,
						));
						writer.next().write_null();
					});
					writer.next().write_bitvec_bytes(&key, key.len() * 8);
				});
			})
		};

		let (modulus, exponent) = rsa_key_parameters(&rsa_key(&[0x01, 0x00, 0x01])).unwrap();
		assert_eq!(modulus, "03".repeat(64));
		assert_eq!(exponent, "65537");

		// nine-byte exponent does not fit u64 and must not be truncated
		let (_, exponent) = rsa_key_parameters(&rsa_key(&[0x01; 9])).unwrap();
		assert_eq!(exponent, format!("0x{}", "01".repeat(9)));
	}

	#[test]
	fn eku_names_resolve_known_and_unknown_oids() {
		let value = yasna::construct_der(|writer| {
			writer.write_sequence(|writer| {
				writer.next().write_oid(&yasna::models::ObjectIdentifier::from_slice(
					crate::oid::OID_EKU_SERVER_AUTH,
				));
				writer.next().write_oid(&yasna::models::ObjectIdentifier::from_slice(&[
					1, 3, 6, 1, 4, 1, 99999, 1,
				]));
			});
		});
		let names = decode_eku_names(&value).unwrap();
		assert_eq!(names, vec!["serverAuth", "1.3.6.1.4.1.99999.1"]);
	}
}

//! X.509 certificate generation from a declarative parameter set.
//!
//! [`CertGenParams`] describes the requested certificate. Every extension
//! has its own include flag and its own criticality flag; nothing is
//! written unless asked for. [`generate`] applies the documented defaults,
//! assembles the to-be-signed structure, signs it with the issuer key and
//! only then realizes the output bytes.

use std::net::IpAddr;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use time::{Duration, OffsetDateTime, Time};
use yasna::models::ObjectIdentifier;
use yasna::models::{GeneralizedTime, UTCTime};
use yasna::{DERWriter, Tag};

use crate::codec::CertificateMaterial;
use crate::dn::{dn_to_attribute_map, DnAttributeMap};
use crate::keys::{IssuerKey, PublicKeyInfo};
use crate::oid;
use crate::sig_algo::{select_signature_algorithm, HashAlg, SignatureAlgorithm};
use crate::Error;

/// Default validity period when neither an explicit window nor a day
/// count is given.
pub const DEFAULT_EXPIRY_DAYS: u32 = 5 * 365;
/// Not-before is backdated by this much to tolerate clock skew.
const NOT_BEFORE_SKEW: Duration = Duration::minutes(10);

/// One of the usages named by the X.509 KeyUsage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KeyUsage {
	DigitalSignature,
	ContentCommitment,
	KeyEncipherment,
	DataEncipherment,
	KeyAgreement,
	KeyCertSign,
	CrlSign,
	EncipherOnly,
	DecipherOnly,
}

impl KeyUsage {
	/// The bit index within the KeyUsage BIT STRING.
	pub fn bit(&self) -> u16 {
		match self {
			KeyUsage::DigitalSignature => 0,
			KeyUsage::ContentCommitment => 1,
			KeyUsage::KeyEncipherment => 2,
			KeyUsage::DataEncipherment => 3,
			KeyUsage::KeyAgreement => 4,
			KeyUsage::KeyCertSign => 5,
			KeyUsage::CrlSign => 6,
			KeyUsage::EncipherOnly => 7,
			KeyUsage::DecipherOnly => 8,
		}
	}
	fn to_u16(self) -> u16 {
		// First bit is the most significant bit of the BIT STRING
		0x8000 >> self.bit()
	}
}

/// A GeneralName as used in subject alternative names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum X509GeneralName {
	/// otherName, an OID plus its DER-encoded value
	OtherName(Vec<u64>, Vec<u8>),
	/// rfc822Name, an email address
	Rfc822Name(String),
	/// dNSName
	DnsName(String),
	/// x400Address, the complete context-tagged DER of the address
	X400Address(Vec<u8>),
	/// directoryName, a DN string
	DirectoryName(String),
	/// ediPartyName, the complete context-tagged DER of the name
	EdiPartyName(Vec<u8>),
	/// uniformResourceIdentifier
	Uri(String),
	/// iPAddress, v4 or v6
	IpAddress(IpAddr),
	/// registeredID
	RegisteredId(Vec<u64>),
}

impl X509GeneralName {
	/// Classifies a host string: an IP literal becomes `IpAddress`,
	/// anything else `DnsName`.
	pub fn from_host_or_ip(host: &str) -> Self {
		match IpAddr::from_str(host) {
			Ok(ip) => X509GeneralName::IpAddress(ip),
			Err(_) => X509GeneralName::DnsName(host.to_string()),
		}
	}

	/// The context tag number of the GeneralName choice arm.
	fn tag(&self) -> u64 {
		match self {
			X509GeneralName::OtherName(..) => 0,
			X509GeneralName::Rfc822Name(_) => 1,
			X509GeneralName::DnsName(_) => 2,
			X509GeneralName::X400Address(_) => 3,
			X509GeneralName::DirectoryName(_) => 4,
			X509GeneralName::EdiPartyName(_) => 5,
			X509GeneralName::Uri(_) => 6,
			X509GeneralName::IpAddress(_) => 7,
			X509GeneralName::RegisteredId(_) => 8,
		}
	}

	fn write_der(&self, writer: DERWriter) -> Result<(), Error> {
		match self {
			X509GeneralName::OtherName(oid, value) => {
				// otherName SEQUENCE { OID, [0] explicit any defined by oid }
				writer.write_tagged_implicit(Tag::context(0), |writer| {
					writer.write_sequence(|writer| {
						writer.next().write_oid(&ObjectIdentifier::from_slice(oid));
						writer
							.next()
							.write_tagged(Tag::context(0), |writer| writer.write_der(value));
					});
				});
			},
			X509GeneralName::Rfc822Name(name)
			| X509GeneralName::DnsName(name)
			| X509GeneralName::Uri(name) => {
				writer.write_tagged_implicit(Tag::context(self.tag()), |writer| {
					writer.write_ia5_string(name)
				});
			},
			X509GeneralName::X400Address(der) | X509GeneralName::EdiPartyName(der) => {
				// already carries its context tag
				writer.write_der(der);
			},
			X509GeneralName::DirectoryName(dn) => {
				// Name is a CHOICE, so directoryName keeps its explicit tag
				let rdns = prepare_rdn_sequence(&dn_to_attribute_map(dn)?)?;
				writer.write_tagged(Tag::context(4), |writer| {
					write_rdn_sequence(writer, &rdns);
				});
			},
			X509GeneralName::IpAddress(IpAddr::V4(addr)) => {
				writer.write_tagged_implicit(Tag::context(7), |writer| {
					writer.write_bytes(&addr.octets())
				});
			},
			X509GeneralName::IpAddress(IpAddr::V6(addr)) => {
				writer.write_tagged_implicit(Tag::context(7), |writer| {
					writer.write_bytes(&addr.octets())
				});
			},
			X509GeneralName::RegisteredId(oid) => {
				writer.write_tagged_implicit(Tag::context(8), |writer| {
					writer.write_oid(&ObjectIdentifier::from_slice(oid))
				});
			},
		}
		Ok(())
	}
}

/// The basic constraints extension request. Always written critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConstraintsExt {
	/// The cA flag
	pub ca: bool,
	/// The path length constraint. Defaults to 0 when `ca` is set.
	pub path_length: Option<u8>,
}

/// One CRL distribution point, a group of URIs reachable for the same CRL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrlDistributionPoint {
	/// URIs of the distribution point
	pub uris: Vec<String>,
}

/// Parameters for certificate generation.
///
/// Only `subject_dn` is mandatory. An extension is emitted only when its
/// corresponding field is set or non-empty, each with an independently
/// controllable criticality flag.
#[derive(Debug, Clone)]
pub struct CertGenParams {
	/// Subject DN string, RFC 2253 form. Mandatory.
	pub subject_dn: String,
	/// Serial number. Defaults to a random positive 64-bit value.
	pub serial_number: Option<u64>,
	/// Start of validity. Defaults to 10 minutes before generation time.
	pub not_before: Option<OffsetDateTime>,
	/// End of validity. Defaults to not-before plus `days_until_expiry`.
	pub not_after: Option<OffsetDateTime>,
	/// Day count used when `not_after` is unset. Defaults to 5 years.
	pub days_until_expiry: Option<u32>,
	/// Explicit signature algorithm. Defaults from the signing key and
	/// `hash_hint`.
	pub signature_algorithm: Option<&'static SignatureAlgorithm>,
	/// Hash to combine with the signing key family when no explicit
	/// algorithm is given.
	pub hash_hint: Option<HashAlg>,
	/// Forces the SHA-1 algorithm variant regardless of `hash_hint`.
	pub prefer_sha1: bool,

	/// Basic constraints, written critical whenever present.
	pub basic_constraints: Option<BasicConstraintsExt>,
	/// Key usages. The extension is written when non-empty.
	pub key_usages: Vec<KeyUsage>,
	/// Criticality of the key usage extension.
	pub key_usage_critical: bool,
	/// Extended key usage OIDs. Written when non-empty.
	pub extended_key_usages: Vec<Vec<u64>>,
	/// Criticality of the extended key usage extension.
	pub extended_key_usage_critical: bool,
	/// Subject alternative names. Written when non-empty.
	pub subject_alt_names: Vec<X509GeneralName>,
	/// Criticality of the subject alternative name extension.
	pub subject_alt_names_critical: bool,
	/// Certificate policy OIDs. Written when non-empty.
	pub certificate_policies: Vec<Vec<u64>>,
	/// Criticality of the certificate policies extension.
	pub certificate_policies_critical: bool,
	/// CRL distribution point URI groups. Written when non-empty.
	pub crl_distribution_points: Vec<CrlDistributionPoint>,
	/// Criticality of the CRL distribution points extension.
	pub crl_distribution_points_critical: bool,
	/// Netscape CRL URL. Written when set.
	pub netscape_crl_url: Option<String>,
	/// Criticality of the Netscape CRL URL extension.
	pub netscape_crl_url_critical: bool,
	/// OCSP responder URIs for authority info access. Written when
	/// non-empty.
	pub ocsp_urls: Vec<String>,
	/// Criticality of the authority info access extension.
	pub authority_info_access_critical: bool,
	/// ISO country codes for the countryOfCitizenship subject directory
	/// attribute. Written when non-empty.
	pub countries_of_citizenship: Vec<String>,
	/// Criticality of the subject directory attributes extension.
	pub subject_directory_attributes_critical: bool,
	/// Include the subject key identifier extension.
	pub include_subject_key_identifier: bool,
	/// Criticality of the subject key identifier extension.
	pub subject_key_identifier_critical: bool,
	/// Include the authority key identifier extension.
	pub include_authority_key_identifier: bool,
	/// Criticality of the authority key identifier extension.
	pub authority_key_identifier_critical: bool,
}

impl CertGenParams {
	/// Parameters with only the subject set, everything else default.
	pub fn new(subject_dn: impl Into<String>) -> Self {
		Self {
			subject_dn: subject_dn.into(),
			serial_number: None,
			not_before: None,
			not_after: None,
			days_until_expiry: None,
			signature_algorithm: None,
			hash_hint: None,
			prefer_sha1: false,
			basic_constraints: None,
			key_usages: Vec::new(),
			key_usage_critical: true,
			extended_key_usages: Vec::new(),
			extended_key_usage_critical: false,
			subject_alt_names: Vec::new(),
			subject_alt_names_critical: false,
			certificate_policies: Vec::new(),
			certificate_policies_critical: false,
			crl_distribution_points: Vec::new(),
			crl_distribution_points_critical: false,
			netscape_crl_url: None,
			netscape_crl_url_critical: false,
			ocsp_urls: Vec::new(),
			authority_info_access_critical: false,
			countries_of_citizenship: Vec::new(),
			subject_directory_attributes_critical: false,
			include_subject_key_identifier: false,
			subject_key_identifier_critical: false,
			include_authority_key_identifier: false,
			authority_key_identifier_critical: false,
		}
	}

	/// Parameters for a CA certificate: basic constraints with path
	/// length 1, certificate and CRL signing usage, and a subject key
	/// identifier.
	pub fn ca_certificate(subject_dn: impl Into<String>, days_until_expiry: u32) -> Self {
		let mut params = Self::new(subject_dn);
		params.days_until_expiry = Some(days_until_expiry);
		params.basic_constraints = Some(BasicConstraintsExt {
			ca: true,
			path_length: Some(1),
		});
		params.key_usages = vec![KeyUsage::KeyCertSign, KeyUsage::CrlSign];
		params.include_subject_key_identifier = true;
		params
	}
}

/// Generates and signs a certificate.
///
/// `issuer_certificate` provides the issuer name and key identifier; when
/// absent the certificate is self-signed and the subject DN doubles as the
/// issuer name. The output is realized only after the signature step
/// succeeds, so a failed generation leaves nothing half-built.
pub fn generate(
	params: &CertGenParams,
	subject_public_key: &PublicKeyInfo,
	issuer_key: &IssuerKey,
	issuer_certificate: Option<&CertificateMaterial>,
) -> Result<CertificateMaterial, Error> {
	let subject = dn_to_attribute_map(&params.subject_dn)?;
	let subject_rdns = prepare_rdn_sequence(&subject)?;

	// Issuer name taken verbatim from the issuer certificate so the chain
	// links byte-for-byte.
	let issuer_name_der = match issuer_certificate {
		Some(cert) => Some(cert.summary()?.subject_raw.clone()),
		None => None,
	};

	let algorithm = match params.signature_algorithm {
		Some(alg) => alg,
		None => {
			let signer = issuer_key.public_key_info()?;
			select_signature_algorithm(
				signer.family(),
				signer.bits(),
				params.hash_hint,
				params.prefer_sha1,
			)?
		},
	};

	let serial = params.serial_number.unwrap_or_else(random_serial);

	let not_before = params
		.not_before
		.unwrap_or_else(|| OffsetDateTime::now_utc() - NOT_BEFORE_SKEW);
	let not_after = match params.not_after {
		Some(t) => t,
		None => {
			let days = params.days_until_expiry.unwrap_or(DEFAULT_EXPIRY_DAYS);
			not_before + Duration::days(days as i64)
		},
	};
	if not_after <= not_before {
		return Err(Error::InvalidValidityPeriod);
	}

	let authority_key_id = if params.include_authority_key_identifier {
		Some(match issuer_certificate {
			Some(cert) => match &cert.summary()?.ski {
				Some(ski) => ski.clone(),
				None => sha1_key_id(&cert.summary()?.key_bits),
			},
			None => issuer_key.public_key_info()?.key_identifier()?,
		})
	} else {
		None
	};

	let tbs = yasna::try_construct_der(|writer| {
		writer.write_sequence(|writer| {
			// version v3
			writer.next().write_tagged(Tag::context(0), |writer| {
				writer.write_u8(2);
			});
			writer
				.next()
				.write_bigint_bytes(&serial.to_be_bytes(), true);
			algorithm.write_alg_ident(writer.next());
			match &issuer_name_der {
				Some(der) => writer.next().write_der(der),
				None => write_rdn_sequence(writer.next(), &subject_rdns),
			}
			writer.next().write_sequence(|writer| {
				write_dt_utc_or_generalized(writer.next(), not_before);
				write_dt_utc_or_generalized(writer.next(), not_after);
			});
			write_rdn_sequence(writer.next(), &subject_rdns);
			writer.next().write_der(subject_public_key.spki_der());

			let should_write_exts = params.basic_constraints.is_some()
				|| !params.key_usages.is_empty()
				|| !params.extended_key_usages.is_empty()
				|| !params.subject_alt_names.is_empty()
				|| !params.certificate_policies.is_empty()
				|| !params.crl_distribution_points.is_empty()
				|| params.netscape_crl_url.is_some()
				|| !params.ocsp_urls.is_empty()
				|| !params.countries_of_citizenship.is_empty()
				|| params.include_subject_key_identifier
				|| authority_key_id.is_some();
			if !should_write_exts {
				return Ok(());
			}
			let mut result = Ok(());
			writer.next().write_tagged(Tag::context(3), |writer| {
				writer.write_sequence(|writer| {
					if params.include_subject_key_identifier {
						write_x509_extension(
							writer.next(),
							oid::OID_SUBJECT_KEY_IDENTIFIER,
							params.subject_key_identifier_critical,
							|writer| match subject_public_key.key_identifier() {
								Ok(ski) => writer.write_bytes(&ski),
								Err(e) => {
									result = Err(e);
									writer.write_bytes(&[]);
								},
							},
						);
					}
					if let Some(key_id) = &authority_key_id {
						write_x509_authority_key_identifier(
							writer.next(),
							params.authority_key_identifier_critical,
							key_id,
						);
					}
					if let Some(constraints) = &params.basic_constraints {
						write_basic_constraints(writer.next(), constraints);
					}
					write_key_usage(writer.next(), params);
					write_extended_key_usage(writer.next(), params);
					if let Err(e) = write_subject_alt_names(writer.next(), params) {
						result = Err(e);
					}
					write_certificate_policies(writer.next(), params);
					write_crl_distribution_points(writer.next(), params);
					write_netscape_crl_url(writer.next(), params);
					write_authority_info_access(writer.next(), params);
					write_subject_directory_attributes(writer.next(), params);
				});
			});
			result
		})
	})?;

	let signature = issuer_key.sign(algorithm, &tbs)?;

	let der = yasna::construct_der(|writer| {
		writer.write_sequence(|writer| {
			writer.next().write_der(&tbs);
			algorithm.write_alg_ident(writer.next());
			writer
				.next()
				.write_bitvec_bytes(&signature, signature.len() * 8);
		});
	});
	Ok(CertificateMaterial::from_validated_der(der))
}

/// An RDN ready for DER serialization.
struct PreparedRdn {
	oid: ObjectIdentifier,
	value: String,
	printable: bool,
}

/// Resolves attribute names to OIDs ahead of serialization, so the writer
/// closures stay infallible.
fn prepare_rdn_sequence(dn: &DnAttributeMap) -> Result<Vec<PreparedRdn>, Error> {
	let mut rdns = Vec::new();
	for (attr, values) in dn.iter() {
		let oid = match attr_to_oid(attr) {
			Some(oid) => oid,
			None => return Err(Error::InvalidDnString(attr.to_string())),
		};
		for value in values {
			rdns.push(PreparedRdn {
				oid: oid.clone(),
				value: value.clone(),
				// countryName is constrained to PrintableString
				printable: attr == "C",
			});
		}
	}
	Ok(rdns)
}

fn attr_to_oid(attr: &str) -> Option<ObjectIdentifier> {
	let components: &[u64] = match attr {
		"CN" => oid::OID_COMMON_NAME,
		"C" => oid::OID_COUNTRY_NAME,
		"L" => oid::OID_LOCALITY_NAME,
		"ST" => oid::OID_STATE_OR_PROVINCE_NAME,
		"STREET" => oid::OID_STREET_ADDRESS,
		"O" => oid::OID_ORG_NAME,
		"OU" => oid::OID_ORG_UNIT_NAME,
		"SN" => oid::OID_SURNAME,
		"T" => oid::OID_TITLE,
		"DC" => oid::OID_DOMAIN_COMPONENT,
		"UID" => oid::OID_USER_ID,
		"EMAILADDRESS" => oid::OID_EMAIL_ADDRESS,
		_ => {
			// numeric OID attribute names pass straight through
			let components = attr
				.split('.')
				.map(|c| c.parse::<u64>().ok())
				.collect::<Option<Vec<_>>>()?;
			if components.len() < 2 {
				return None;
			}
			return Some(ObjectIdentifier::new(components));
		},
	};
	Some(ObjectIdentifier::from_slice(components))
}

fn write_rdn_sequence(writer: DERWriter, rdns: &[PreparedRdn]) {
	writer.write_sequence(|writer| {
		for rdn in rdns {
			writer.next().write_set(|writer| {
				writer.next().write_sequence(|writer| {
					writer.next().write_oid(&rdn.oid);
					if rdn.printable {
						writer.next().write_printable_string(&rdn.value);
					} else {
						writer.next().write_utf8_string(&rdn.value);
					}
				});
			});
		}
	});
}

fn dt_strip_nanos(dt: OffsetDateTime) -> OffsetDateTime {
	// UTCTime and GeneralizedTime have second precision
	if dt.nanosecond() == 0 {
		return dt;
	}
	match Time::from_hms(dt.hour(), dt.minute(), dt.second()) {
		Ok(time) => dt.replace_time(time),
		Err(_) => dt,
	}
}

fn write_dt_utc_or_generalized(writer: DERWriter, dt: OffsetDateTime) {
	// RFC 5280 requires validity dates below 2050 as UTCTime and
	// anything from 2050 on as GeneralizedTime. UTCTime cannot represent
	// dates before 1950 either, so those get GeneralizedTime too.
	let dt = dt_strip_nanos(dt);
	if (1950..2050).contains(&dt.year()) {
		writer.write_utctime(&UTCTime::from_datetime(dt));
	} else {
		writer.write_generalized_time(&GeneralizedTime::from_datetime(dt));
	}
}

/// Serializes one X.509v3 extension according to RFC 5280.
fn write_x509_extension(
	writer: DERWriter,
	extension_oid: &[u64],
	is_critical: bool,
	value_serializer: impl FnOnce(DERWriter),
) {
	// Extension ::= SEQUENCE {
	//     extnID      OBJECT IDENTIFIER,
	//     critical    BOOLEAN DEFAULT FALSE,
	//     extnValue   OCTET STRING }
	writer.write_sequence(|writer| {
		writer
			.next()
			.write_oid(&ObjectIdentifier::from_slice(extension_oid));
		if is_critical {
			writer.next().write_bool(true);
		}
		let bytes = yasna::construct_der(value_serializer);
		writer.next().write_bytes(&bytes);
	})
}

fn write_x509_authority_key_identifier(writer: DERWriter, critical: bool, key_id: &[u8]) {
	write_x509_extension(writer, oid::OID_AUTHORITY_KEY_IDENTIFIER, critical, |writer| {
		writer.write_sequence(|writer| {
			writer
				.next()
				.write_tagged_implicit(Tag::context(0), |writer| writer.write_bytes(key_id))
		});
	});
}

fn write_basic_constraints(writer: DERWriter, constraints: &BasicConstraintsExt) {
	// "Conforming CAs MUST mark this extension as critical"
	write_x509_extension(writer, oid::OID_BASIC_CONSTRAINTS, true, |writer| {
		writer.write_sequence(|writer| {
			if constraints.ca {
				writer.next().write_bool(true);
				let path_length = constraints.path_length.unwrap_or(0);
				writer.next().write_u8(path_length);
			}
		});
	});
}

fn write_key_usage(writer: DERWriter, params: &CertGenParams) {
	const KEY_USAGE_BITS: usize = 9;
	if params.key_usages.is_empty() {
		return;
	}
	write_x509_extension(writer, oid::OID_KEY_USAGE, params.key_usage_critical, |writer| {
		let bit_string = params
			.key_usages
			.iter()
			.fold(0u16, |bit_string, usage| bit_string | usage.to_u16());
		writer.write_bitvec_bytes(&bit_string.to_be_bytes(), KEY_USAGE_BITS);
	});
}

fn write_extended_key_usage(writer: DERWriter, params: &CertGenParams) {
	if params.extended_key_usages.is_empty() {
		return;
	}
	write_x509_extension(
		writer,
		oid::OID_EXT_KEY_USAGE,
		params.extended_key_usage_critical,
		|writer| {
			writer.write_sequence(|writer| {
				for usage in &params.extended_key_usages {
					writer
						.next()
						.write_oid(&ObjectIdentifier::from_slice(usage));
				}
			});
		},
	);
}

fn write_subject_alt_names(writer: DERWriter, params: &CertGenParams) -> Result<(), Error> {
	if params.subject_alt_names.is_empty() {
		return Ok(());
	}
	let mut result = Ok(());
	write_x509_extension(
		writer,
		oid::OID_SUBJECT_ALT_NAME,
		params.subject_alt_names_critical,
		|writer| {
			writer.write_sequence(|writer| {
				for san in &params.subject_alt_names {
					if let Err(e) = san.write_der(writer.next()) {
						result = Err(e);
					}
				}
			});
		},
	);
	result
}

fn write_certificate_policies(writer: DERWriter, params: &CertGenParams) {
	if params.certificate_policies.is_empty() {
		return;
	}
	write_x509_extension(
		writer,
		oid::OID_CERTIFICATE_POLICIES,
		params.certificate_policies_critical,
		|writer| {
			writer.write_sequence(|writer| {
				for policy in &params.certificate_policies {
					// PolicyInformation ::= SEQUENCE { policyIdentifier OID }
					writer.next().write_sequence(|writer| {
						writer
							.next()
							.write_oid(&ObjectIdentifier::from_slice(policy));
					});
				}
			});
		},
	);
}

fn write_crl_distribution_points(writer: DERWriter, params: &CertGenParams) {
	if params.crl_distribution_points.is_empty() {
		return;
	}
	write_x509_extension(
		writer,
		oid::OID_CRL_DISTRIBUTION_POINTS,
		params.crl_distribution_points_critical,
		|writer| {
			writer.write_sequence(|writer| {
				for point in &params.crl_distribution_points {
					// DistributionPoint SEQUENCE
					writer.next().write_sequence(|writer| {
						// distributionPoint [0] DistributionPointName
						writer.next().write_tagged_implicit(
							Tag::context(0),
							|writer| {
								writer.write_sequence(|writer| {
									// fullName [0] GeneralNames
									writer.next().write_tagged_implicit(
										Tag::context(0),
										|writer| {
											writer.write_sequence(|writer| {
												for uri in &point.uris {
													writer.next().write_tagged_implicit(
														Tag::context(6),
														|writer| writer.write_ia5_string(uri),
													);
												}
											})
										},
									);
								});
							},
						);
					});
				}
			})
		},
	);
}

fn write_netscape_crl_url(writer: DERWriter, params: &CertGenParams) {
	let Some(url) = &params.netscape_crl_url else {
		return;
	};
	write_x509_extension(
		writer,
		oid::OID_NETSCAPE_CRL_URL,
		params.netscape_crl_url_critical,
		|writer| writer.write_ia5_string(url),
	);
}

fn write_authority_info_access(writer: DERWriter, params: &CertGenParams) {
	if params.ocsp_urls.is_empty() {
		return;
	}
	write_x509_extension(
		writer,
		oid::OID_AUTHORITY_INFO_ACCESS,
		params.authority_info_access_critical,
		|writer| {
			writer.write_sequence(|writer| {
				for url in &params.ocsp_urls {
					// AccessDescription ::= SEQUENCE { accessMethod OID,
					//     accessLocation GeneralName }
					writer.next().write_sequence(|writer| {
						writer
							.next()
							.write_oid(&ObjectIdentifier::from_slice(oid::OID_AD_OCSP));
						writer
							.next()
							.write_tagged_implicit(Tag::context(6), |writer| {
								writer.write_ia5_string(url)
							});
					});
				}
			});
		},
	);
}

fn write_subject_directory_attributes(writer: DERWriter, params: &CertGenParams) {
	if params.countries_of_citizenship.is_empty() {
		return;
	}
	write_x509_extension(
		writer,
		oid::OID_SUBJECT_DIRECTORY_ATTRIBUTES,
		params.subject_directory_attributes_critical,
		|writer| {
			writer.write_sequence(|writer| {
				// Attribute ::= SEQUENCE { type OID, values SET OF ANY }
				writer.next().write_sequence(|writer| {
					writer.next().write_oid(&ObjectIdentifier::from_slice(
						oid::OID_COUNTRY_OF_CITIZENSHIP,
					));
					writer.next().write_set_of(|writer| {
						for country in &params.countries_of_citizenship {
							writer.next().write_printable_string(country);
						}
					});
				});
			});
		},
	);
}

/// A uniformly random serial in `1..=i64::MAX`. DER serials are signed, so
/// the top bit stays clear; zero is retried away.
fn random_serial() -> u64 {
	loop {
		let serial = OsRng.next_u64() >> 1;
		if serial != 0 {
			return serial;
		}
	}
}

fn sha1_key_id(key_bits: &[u8]) -> Vec<u8> {
	use sha1::{Digest, Sha1};
	Sha1::digest(key_bits).to_vec()
}

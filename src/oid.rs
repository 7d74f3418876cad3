//! OID constants consumed and produced by the crate.

/// id-at-countryName in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_COUNTRY_NAME: &[u64] = &[2, 5, 4, 6];
/// id-at-localityName in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_LOCALITY_NAME: &[u64] = &[2, 5, 4, 7];
/// id-at-stateOrProvinceName in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_STATE_OR_PROVINCE_NAME: &[u64] = &[2, 5, 4, 8];
/// id-at-streetAddress in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_STREET_ADDRESS: &[u64] = &[2, 5, 4, 9];
/// id-at-organizationName in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_ORG_NAME: &[u64] = &[2, 5, 4, 10];
/// id-at-organizationalUnitName in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_ORG_UNIT_NAME: &[u64] = &[2, 5, 4, 11];
/// id-at-commonName in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_COMMON_NAME: &[u64] = &[2, 5, 4, 3];
/// id-at-surname in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_SURNAME: &[u64] = &[2, 5, 4, 4];
/// id-at-title in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_TITLE: &[u64] = &[2, 5, 4, 12];
/// id-domainComponent in [RFC 4519](https://www.rfc-editor.org/rfc/rfc4519)
pub const OID_DOMAIN_COMPONENT: &[u64] = &[0, 9, 2342, 19200300, 100, 1, 25];
/// id-userid in [RFC 4519](https://www.rfc-editor.org/rfc/rfc4519)
pub const OID_USER_ID: &[u64] = &[0, 9, 2342, 19200300, 100, 1, 1];
/// pkcs-9-at-emailAddress in [RFC 2985](https://www.rfc-editor.org/rfc/rfc2985)
pub const OID_EMAIL_ADDRESS: &[u64] = &[1, 2, 840, 113549, 1, 9, 1];

/// id-ce-subjectKeyIdentifier in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_SUBJECT_KEY_IDENTIFIER: &[u64] = &[2, 5, 29, 14];
/// id-ce-keyUsage in [RFC 5280](https://tools.ietf.org/html/rfc5280#appendix-A.2)
pub const OID_KEY_USAGE: &[u64] = &[2, 5, 29, 15];
/// id-ce-subjectAltName in [RFC 5280](https://tools.ietf.org/html/rfc5280#appendix-A.2)
pub const OID_SUBJECT_ALT_NAME: &[u64] = &[2, 5, 29, 17];
/// id-ce-basicConstraints in [RFC 5280](https://tools.ietf.org/html/rfc5280#appendix-A.2)
pub const OID_BASIC_CONSTRAINTS: &[u64] = &[2, 5, 29, 19];
/// id-ce-cRLDistributionPoints in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_CRL_DISTRIBUTION_POINTS: &[u64] = &[2, 5, 29, 31];
/// id-ce-certificatePolicies in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_CERTIFICATE_POLICIES: &[u64] = &[2, 5, 29, 32];
/// id-ce-authorityKeyIdentifier in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_AUTHORITY_KEY_IDENTIFIER: &[u64] = &[2, 5, 29, 35];
/// id-ce-extKeyUsage in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_EXT_KEY_USAGE: &[u64] = &[2, 5, 29, 37];
/// id-ce-subjectDirectoryAttributes in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_SUBJECT_DIRECTORY_ATTRIBUTES: &[u64] = &[2, 5, 29, 9];

/// netscape-cert-crl-url, the pre-standard CRL pointer some issuers still emit
pub const OID_NETSCAPE_CRL_URL: &[u64] = &[2, 16, 840, 1, 113730, 1, 4];

/// id-pe-authorityInfoAccess in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_AUTHORITY_INFO_ACCESS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 1];
/// id-ad-ocsp in [RFC 5280](https://www.rfc-editor.org/rfc/rfc5280#appendix-A)
pub const OID_AD_OCSP: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 48, 1];

/// id-pda-countryOfCitizenship in [RFC 3739](https://www.rfc-editor.org/rfc/rfc3739)
pub const OID_COUNTRY_OF_CITIZENSHIP: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 9, 4];

/// anyExtendedKeyUsage in [RFC 5280](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
pub const OID_EKU_ANY: &[u64] = &[2, 5, 29, 37, 0];
/// id-kp-serverAuth in [RFC 5280](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
pub const OID_EKU_SERVER_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 1];
/// id-kp-clientAuth in [RFC 5280](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
pub const OID_EKU_CLIENT_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 2];
/// id-kp-codeSigning in [RFC 5280](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
pub const OID_EKU_CODE_SIGNING: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 3];
/// id-kp-emailProtection in [RFC 5280](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
pub const OID_EKU_EMAIL_PROTECTION: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 4];
/// id-kp-timeStamping in [RFC 5280](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
pub const OID_EKU_TIME_STAMPING: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 8];
/// id-kp-OCSPSigning in [RFC 5280](https://tools.ietf.org/html/rfc5280#section-4.2.1.12)
pub const OID_EKU_OCSP_SIGNING: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 9];

/// rsaEncryption in [RFC 4055](https://www.rfc-editor.org/rfc/rfc4055#section-6)
pub const OID_RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 1];
/// id-ecPublicKey in [RFC 5480](https://datatracker.ietf.org/doc/html/rfc5480#appendix-A)
pub const OID_EC_PUBLIC_KEY: &[u64] = &[1, 2, 840, 10045, 2, 1];
/// id-dsa in [RFC 3279](https://www.rfc-editor.org/rfc/rfc3279#section-2.3.2)
pub const OID_DSA: &[u64] = &[1, 2, 840, 10040, 4, 1];

/// secp256r1 in [RFC 5480](https://datatracker.ietf.org/doc/html/rfc5480#appendix-A)
pub const OID_EC_SECP_256_R1: &[u64] = &[1, 2, 840, 10045, 3, 1, 7];
/// secp384r1 in [RFC 5480](https://datatracker.ietf.org/doc/html/rfc5480#appendix-A)
pub const OID_EC_SECP_384_R1: &[u64] = &[1, 3, 132, 0, 34];
/// secp521r1 in [RFC 5480](https://datatracker.ietf.org/doc/html/rfc5480#appendix-A)
pub const OID_EC_SECP_521_R1: &[u64] = &[1, 3, 132, 0, 35];

/// Formats an OID slice in the usual dotted notation.
pub(crate) fn oid_to_string(oid: &[u64]) -> String {
	oid.iter()
		.map(|c| c.to_string())
		.collect::<Vec<_>>()
		.join(".")
}

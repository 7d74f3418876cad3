use std::fmt;

/// The error type of the certforge crate
#[derive(Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
	/// The given bytes could not be parsed as an X.509 certificate
	CouldNotParseCertificate,
	/// An entry of a certificate chain was not an X.509 certificate
	ChainEntryNotACertificate,
	/// The given bytes could not be parsed as a certification request
	CouldNotParseCertificationRequest,
	/// A PEM begin marker was required but not found
	PemMissingBeginMarker,
	/// A PEM begin marker was present without a matching end marker
	PemMissingEndMarker,
	/// The base64 payload of a PEM block was malformed
	InvalidBase64,
	/// The PEM block did not carry a recognized private key marker
	UnknownPrivateKeyFormat,
	/// The private key block is passphrase protected (`DEK-Info` header)
	EncryptedKeyUnsupported,
	/// The ASN.1 structure of a private key could not be decoded
	CouldNotParsePrivateKey,
	/// A distinguished name string was syntactically invalid
	InvalidDnString(String),
	/// Certificate generation failed; the contained string names the cause
	CertificateGeneration(String),
	/// The requested hash/key algorithm combination is not supported
	UnsupportedSignatureAlgorithm,
	/// A hex field of a certificate-check header could not be decoded
	InvalidVerifierHex,
	/// The password-derived secret could not be computed
	SecretDerivationFailed,
	/// The validity window could not be represented
	InvalidValidityPeriod,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		use self::Error::*;
		match self {
			CouldNotParseCertificate => write!(f, "could not parse certificate"),
			ChainEntryNotACertificate => {
				write!(f, "chain entry could not be parsed as an X.509 certificate")
			},
			CouldNotParseCertificationRequest => {
				write!(f, "could not parse certification request")
			},
			PemMissingBeginMarker => write!(f, "PEM begin marker not found"),
			PemMissingEndMarker => {
				write!(f, "PEM begin marker present without a matching end marker")
			},
			InvalidBase64 => write!(f, "malformed base64 payload"),
			UnknownPrivateKeyFormat => write!(f, "unrecognized private key PEM marker"),
			EncryptedKeyUnsupported => {
				write!(f, "encrypted private keys are not supported")
			},
			CouldNotParsePrivateKey => write!(f, "could not decode private key structure"),
			InvalidDnString(dn) => write!(f, "invalid distinguished name: {dn}"),
			CertificateGeneration(cause) => {
				write!(f, "certificate generation failed: {cause}")
			},
			UnsupportedSignatureAlgorithm => {
				write!(f, "unsupported hash/key algorithm combination")
			},
			InvalidVerifierHex => {
				write!(f, "certificate check header carried malformed hex")
			},
			SecretDerivationFailed => {
				write!(f, "could not derive password-based secret")
			},
			InvalidValidityPeriod => write!(f, "validity window cannot be represented"),
		}
	}
}

impl std::error::Error for Error {}

/*!
X.509 certificate lifecycle and trust verification engine

This crate handles the certificate plumbing of a security gateway:
decoding and encoding certificates, certificate chains, CSRs and private
keys across the PEM/DER boundary, parsing and canonicalizing X.500
distinguished names with wildcard and regex pattern matching, generating
signed X.509 certificates from a declarative parameter set, extracting
display properties from existing certificates, and running a nonce-based
challenge/response protocol that proves possession of a certificate tied
to a password-derived secret.

## Example

```
use certforge::{generate, CertGenParams, IssuerKey, KeyUsage};

# fn main() -> Result<(), certforge::Error> {
let key = rsa::RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048)
	.map_err(|e| certforge::Error::CertificateGeneration(e.to_string()))?;
let issuer = IssuerKey::Rsa(key);
let mut params = CertGenParams::new("cn=Gateway Test,o=Example");
params.key_usages = vec![KeyUsage::DigitalSignature];
let cert = generate(&params, &issuer.public_key_info()?, &issuer, None)?;
println!("{}", cert.to_pem());
# Ok(())
# }
```
*/
#![forbid(unsafe_code)]
#![forbid(non_ascii_idents)]
#![deny(missing_docs)]
#![allow(clippy::complexity, clippy::style, clippy::pedantic)]

pub mod challenge;
pub mod codec;
pub mod dn;
mod error;
pub mod generator;
pub mod inspect;
pub mod keys;
mod oid;
pub mod sig_algo;

pub use crate::challenge::{CertificateCheck2Info, Pre60CertificateCheckInfo, NOPASS};
pub use crate::codec::{
	decode_certificate, decode_certificate_chain, decode_csr, decode_private_key_from_pem,
	encode_as_pem, CertificateMaterial, PrivateKeyMaterial,
};
pub use crate::dn::{
	dn_matches_pattern, dn_to_attribute_map, domain_name_matches_pattern, DnAttributeMap,
	DnCanonicalizer, DnFormatter,
};
pub use crate::error::Error;
pub use crate::generator::{
	generate, BasicConstraintsExt, CertGenParams, CrlDistributionPoint, KeyUsage,
	X509GeneralName,
};
pub use crate::inspect::{
	days_until_expiry, expiry_severity, fingerprint, properties, ExpirySeverity,
	FingerprintFormat,
};
pub use crate::keys::{IssuerKey, PublicKeyInfo};
pub use crate::sig_algo::{HashAlg, KeyFamily, SignatureAlgorithm};

//! TLS 1.2 key schedule against fixed vectors and an independent P_hash.

mod common;

use common::{p_hash, registry};
use ectls_core::ectls_crypto::{HashAlgorithm, PrfAlgorithm};
use ectls_core::tls12::prf::{
    compute_verify_data, derive_key_block_for_suite, derive_master_secret, Tls12Prf,
    CLIENT_FINISHED_LABEL, SERVER_FINISHED_LABEL,
};
use ectls_core::CipherSuite;

#[test]
fn test_p_sha256_vector() {
    // Widely circulated P_SHA256 test vector for the TLS 1.2 PRF.
    let secret = hex::decode("9bbe436ba940f017b17652849a71db35").unwrap();
    let seed = hex::decode("a0ba9f936cda311827a6f796ffd5198c").unwrap();
    let expected = hex::decode(
        "e3f229ba727be17b8d122620557cd453c2aab21d07c3d495329b52d4e61edb5a\
         6b301791e90d35c9c9a46b4e14baf9af0fa022f7077def17abfd3797c0564bab\
         4fbc91666e9def9b97fce34f796789baa48082d122ee42c5a72e5a5110fff701\
         87347b66",
    )
    .unwrap();

    let registry = registry();
    let out = Tls12Prf::new(&registry, PrfAlgorithm::TlsPrfSha256)
        .compute(&secret, b"test label", &seed, 100)
        .unwrap();
    assert_eq!(out.as_slice(), expected.as_slice());
}

#[test]
fn test_fixed_master_secret_and_key_block() {
    let registry = registry();
    let randoms = [0u8; 32];
    let pre_master = [0x42u8; 32];

    let master = derive_master_secret(
        &registry,
        PrfAlgorithm::TlsPrfSha256,
        &pre_master,
        &randoms,
        &randoms,
    )
    .unwrap();
    assert_eq!(
        hex::encode(master.as_slice()),
        "fb6a551986fa2b2a5d88d2f64c3e7a40addb724ec8f79b39806a19df04c91120\
         0717fc604d3fbaf5b94d67b264fedbae"
    );

    let block = derive_key_block_for_suite(
        &registry,
        CipherSuite::EcdheEcdsaWithAes128GcmSha256,
        &master,
        &randoms,
        &randoms,
    )
    .unwrap();
    assert_eq!(
        hex::encode(block.as_bytes()),
        "0c88f77c9da007254c490137243ecc71c184eff93be2da36e68b4ff516eb0ad7\
         10826cebff1fbeb8"
    );
    assert_eq!(block.client_mac_key(), b"");
    assert_eq!(block.client_key(), &block.as_bytes()[..16]);
    assert_eq!(block.server_key(), &block.as_bytes()[16..32]);
    assert_eq!(block.client_iv(), &block.as_bytes()[32..36]);
    assert_eq!(block.server_iv(), &block.as_bytes()[36..40]);
}

#[test]
fn test_prf_matches_reference_for_both_hashes() {
    let registry = registry();
    let secret = [0x0bu8; 48];
    let seed = [0x17u8; 64];

    for (prf, hash) in [
        (PrfAlgorithm::TlsPrfSha256, HashAlgorithm::Sha256),
        (PrfAlgorithm::TlsPrfSha384, HashAlgorithm::Sha384),
    ] {
        // Lengths straddling the HMAC output size.
        for len in [1, 12, 31, 32, 33, 48, 64, 104, 200] {
            let ours = Tls12Prf::new(&registry, prf)
                .compute(&secret, b"key expansion", &seed, len)
                .unwrap();
            assert_eq!(
                ours.as_slice(),
                p_hash(hash, &secret, b"key expansion", &seed, len).as_slice(),
                "{:?} len {}",
                prf,
                len
            );
        }
    }
}

#[test]
fn test_key_block_layout_every_suite() {
    let registry = registry();
    let master = [0x33u8; 48];
    let client_random = [0x01u8; 32];
    let server_random = [0x02u8; 32];

    for suite in CipherSuite::ALL {
        let (mac, key, iv) = (suite.mac_len(), suite.key_len(), suite.fixed_iv_len());
        let mut seed = server_random.to_vec();
        seed.extend_from_slice(&client_random);
        let reference = p_hash(
            suite.prf_hash(),
            &master,
            b"key expansion",
            &seed,
            2 * (mac + key + iv),
        );

        let keys = derive_key_block_for_suite(&registry, suite, &master, &server_random, &client_random)
            .unwrap()
            .into_session_keys(suite);

        assert_eq!(keys.client_write.mac_key.as_slice(), &reference[..mac], "{}", suite);
        assert_eq!(keys.server_write.mac_key.as_slice(), &reference[mac..2 * mac]);
        assert_eq!(keys.client_write.cipher_key.as_slice(), &reference[2 * mac..2 * mac + key]);
        assert_eq!(
            keys.server_write.cipher_key.as_slice(),
            &reference[2 * mac + key..2 * (mac + key)]
        );
        assert_eq!(
            keys.client_write.iv.as_slice(),
            &reference[2 * (mac + key)..2 * (mac + key) + iv]
        );
        assert_eq!(keys.server_write.iv.as_slice(), &reference[2 * (mac + key) + iv..]);
        assert_eq!(keys.cipher_suite(), suite);
    }
}

#[test]
fn test_verify_data_labels_differ() {
    let registry = registry();
    let master = [0x44u8; 48];
    let transcript = [0x55u8; 32];

    let client = compute_verify_data(
        &registry,
        PrfAlgorithm::TlsPrfSha256,
        &master,
        CLIENT_FINISHED_LABEL,
        &transcript,
    )
    .unwrap();
    let server = compute_verify_data(
        &registry,
        PrfAlgorithm::TlsPrfSha256,
        &master,
        SERVER_FINISHED_LABEL,
        &transcript,
    )
    .unwrap();

    assert_ne!(client, server);
    assert_eq!(
        client.as_slice(),
        p_hash(HashAlgorithm::Sha256, &master, b"client finished", &transcript, 12).as_slice()
    );
}

#[test]
fn test_rejects_bad_lengths() {
    let registry = registry();
    assert!(derive_master_secret(&registry, PrfAlgorithm::TlsPrfSha256, &[1; 32], &[0; 31], &[0; 32]).is_err());
    assert!(derive_key_block_for_suite(
        &registry,
        CipherSuite::EcdheRsaWithAes128GcmSha256,
        &[0; 47],
        &[0; 32],
        &[0; 32],
    )
    .is_err());
}

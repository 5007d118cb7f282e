//! Record protection between two independent record layers.

mod common;

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use common::registry;
use ectls_core::protocol::ContentType;
use ectls_core::tls12::prf::derive_key_block_for_suite;
use ectls_core::tls12::{CipherContext, Direction, RecordLayer};
use ectls_core::{CipherSuite, DirectionKeys, Error};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384};
use zeroize::Zeroizing;

/// Writer and reader sharing the client_write keys of `suite`.
fn pair(suite: CipherSuite) -> (RecordLayer, RecordLayer) {
    let registry = registry();
    let keys = derive_key_block_for_suite(&registry, suite, &[0x21; 48], &[0x01; 32], &[0x02; 32])
        .unwrap()
        .into_session_keys(suite);

    let mut writer = RecordLayer::new(registry.clone());
    let mut reader = RecordLayer::new(registry.clone());
    writer.activate_change_cipher_spec(
        Direction::Write,
        CipherContext::new(&registry, &keys.client_write).unwrap(),
    );
    reader.activate_change_cipher_spec(
        Direction::Read,
        CipherContext::new(&registry, &keys.client_write).unwrap(),
    );
    (writer, reader)
}

#[test]
fn test_every_bit_flip_is_rejected() {
    for suite in [
        CipherSuite::EcdheRsaWithAes128GcmSha256,
        CipherSuite::EcdheRsaWithAes128CbcSha256,
    ] {
        let (mut writer, _) = pair(suite);
        let record = writer
            .write_record(ContentType::ApplicationData, b"attack at dawn")
            .unwrap();

        // Header bits are covered by the MAC/AAD as well, apart from the
        // length which would just misframe the record.
        for byte in (0..3).chain(5..record.len()) {
            for bit in 0..8 {
                let (_, mut reader) = pair(suite);
                let mut tampered = record.clone();
                tampered[byte] ^= 1 << bit;

                let result = reader.read_record(&tampered);
                assert!(result.is_err(), "{} byte {} bit {}", suite, byte, bit);
                if byte >= 5 {
                    assert_eq!(result, Err(Error::DecryptionFailed), "{} byte {}", suite, byte);
                }
            }
        }

        let (_, mut reader) = pair(suite);
        assert_eq!(
            reader.read_record(&record).unwrap(),
            (ContentType::ApplicationData, b"attack at dawn".to_vec())
        );
    }
}

#[test]
fn test_sequence_numbers_advance_in_lockstep() {
    for suite in CipherSuite::ALL {
        let (mut writer, mut reader) = pair(suite);
        for i in 0u64..20 {
            let payload = vec![i as u8; i as usize * 37];
            let record = writer.write_record(ContentType::ApplicationData, &payload).unwrap();
            assert_eq!(writer.sequence_number(Direction::Write), i + 1);

            let (content_type, body) = reader.read_record(&record).unwrap();
            assert_eq!(content_type, ContentType::ApplicationData);
            assert_eq!(body, payload);
            assert_eq!(reader.sequence_number(Direction::Read), i + 1);
        }
    }
}

#[test]
fn test_dropped_record_breaks_the_stream() {
    let (mut writer, mut reader) = pair(CipherSuite::EcdheEcdsaWithAes256GcmSha384);
    let _lost = writer.write_record(ContentType::ApplicationData, b"one").unwrap();
    let second = writer.write_record(ContentType::ApplicationData, b"two").unwrap();

    assert_eq!(reader.read_record(&second), Err(Error::DecryptionFailed));
}

#[test]
fn test_wrong_direction_keys() {
    let suite = CipherSuite::EcdheEcdsaWithAes128CbcSha256;
    let registry = registry();
    let keys = derive_key_block_for_suite(&registry, suite, &[0x21; 48], &[0x01; 32], &[0x02; 32])
        .unwrap()
        .into_session_keys(suite);

    let mut writer = RecordLayer::new(registry.clone());
    let mut reader = RecordLayer::new(registry.clone());
    writer.activate_change_cipher_spec(
        Direction::Write,
        CipherContext::new(&registry, &keys.client_write).unwrap(),
    );
    reader.activate_change_cipher_spec(
        Direction::Read,
        CipherContext::new(&registry, &keys.server_write).unwrap(),
    );

    let record = writer.write_record(ContentType::Handshake, &[0x14; 16]).unwrap();
    assert_eq!(reader.read_record(&record), Err(Error::DecryptionFailed));
}

fn fixed_keys(suite: CipherSuite, mac_key: &[u8], cipher_key: &[u8], iv: &[u8]) -> DirectionKeys {
    DirectionKeys {
        mac_key: Zeroizing::new(mac_key.to_vec()),
        cipher_key: Zeroizing::new(cipher_key.to_vec()),
        iv: Zeroizing::new(iv.to_vec()),
        cipher_suite: suite,
    }
}

#[test]
fn test_gcm_record_known_answer() {
    // AES-128-GCM, nonce = salt || seq, aad = seq || type || version || length.
    let registry = registry();
    let keys = fixed_keys(
        CipherSuite::EcdheEcdsaWithAes128GcmSha256,
        &[],
        &[0x01; 16],
        &[0x02; 4],
    );
    let expected = hex::decode(
        "16030300230000000000000000b9d33fcefb91778e569f210bf9bcc5f9c32f1459626aa3cb2040e5",
    )
    .unwrap();

    let mut writer = RecordLayer::new(registry.clone());
    writer.activate_change_cipher_spec(Direction::Write, CipherContext::new(&registry, &keys).unwrap());
    assert_eq!(writer.write_record(ContentType::Handshake, b"hello world").unwrap(), expected);

    let mut reader = RecordLayer::new(registry.clone());
    reader.activate_change_cipher_spec(Direction::Read, CipherContext::new(&registry, &keys).unwrap());
    assert_eq!(
        reader.read_record(&expected).unwrap(),
        (ContentType::Handshake, b"hello world".to_vec())
    );
}

#[test]
fn test_cbc_record_known_answer() {
    // AES-128-CBC with HMAC-SHA256 and IV 0x05 * 16, built outside this crate.
    let registry = registry();
    let keys = fixed_keys(
        CipherSuite::EcdheEcdsaWithAes128CbcSha256,
        &[0x04; 32],
        &[0x03; 16],
        &[],
    );
    let record = hex::decode(concat!(
        "1703030040",
        "05050505050505050505050505050505",
        "8680354eca391d48a91b32a378b79ee278a7ebfddc55b1e21d27f81adba1f7e5",
        "ba929f2bc9debacbac2470e354d449a1",
    ))
    .unwrap();

    let mut reader = RecordLayer::new(registry.clone());
    reader.activate_change_cipher_spec(Direction::Read, CipherContext::new(&registry, &keys).unwrap());
    assert_eq!(
        reader.read_record(&record).unwrap(),
        (ContentType::ApplicationData, b"hello world".to_vec())
    );
}

#[test]
fn test_cbc_records_decrypt_with_raw_primitives() {
    let registry = registry();
    let suite = CipherSuite::EcdheRsaWithAes256CbcSha384;
    let mac_key = [0x0b; 48];
    let cipher_key = [0x0c; 32];
    let keys = fixed_keys(suite, &mac_key, &cipher_key, &[]);

    let mut writer = RecordLayer::new(registry.clone());
    writer.activate_change_cipher_spec(Direction::Write, CipherContext::new(&registry, &keys).unwrap());

    let payloads: [&[u8]; 4] = [b"", b"x", &[0x42; 47], &[0x17; 300]];
    for (seq, payload) in payloads.into_iter().enumerate() {
        let record = writer.write_record(ContentType::ApplicationData, payload).unwrap();
        assert_eq!(&record[..3], &[23, 3, 3]);
        assert_eq!(usize::from(u16::from_be_bytes([record[3], record[4]])), record.len() - 5);

        let (iv, ciphertext) = record[5..].split_at(16);
        let mut plaintext = cbc::Decryptor::<aes::Aes256>::new_from_slices(&cipher_key, iv)
            .unwrap()
            .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
            .unwrap();

        let pad = usize::from(*plaintext.last().unwrap());
        assert!(plaintext[plaintext.len() - pad - 1..].iter().all(|&b| usize::from(b) == pad));
        plaintext.truncate(plaintext.len() - pad - 1);
        let (body, tag) = plaintext.split_at(plaintext.len() - 48);
        assert_eq!(body, payload);

        let mut mac = Hmac::<Sha384>::new_from_slice(&mac_key).unwrap();
        mac.update(&(seq as u64).to_be_bytes());
        mac.update(&[23, 3, 3]);
        mac.update(&(payload.len() as u16).to_be_bytes());
        mac.update(payload);
        assert_eq!(mac.finalize().into_bytes().as_slice(), tag, "record {}", seq);
    }
}

#[test]
fn test_cbc_mac_covers_sequence_number() {
    // The same payload at seq 0 and seq 1 must carry different MACs.
    let registry = registry();
    let suite = CipherSuite::EcdheEcdsaWithAes128CbcSha256;
    let mac_key = [0x0d; 32];
    let cipher_key = [0x0e; 16];
    let keys = fixed_keys(suite, &mac_key, &cipher_key, &[]);

    let mut writer = RecordLayer::new(registry.clone());
    writer.activate_change_cipher_spec(Direction::Write, CipherContext::new(&registry, &keys).unwrap());

    let tags: Vec<Vec<u8>> = (0..2)
        .map(|_| {
            let record = writer.write_record(ContentType::Alert, &[1, 0]).unwrap();
            let (iv, ciphertext) = record[5..].split_at(16);
            let plaintext = cbc::Decryptor::<aes::Aes128>::new_from_slices(&cipher_key, iv)
                .unwrap()
                .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
                .unwrap();
            plaintext[2..34].to_vec()
        })
        .collect();

    for (seq, tag) in tags.iter().enumerate() {
        let mut mac = Hmac::<Sha256>::new_from_slice(&mac_key).unwrap();
        mac.update(&(seq as u64).to_be_bytes());
        mac.update(&[21, 3, 3, 0, 2, 1, 0]);
        assert_eq!(mac.finalize().into_bytes().as_slice(), tag.as_slice());
    }
    assert_ne!(tags[0], tags[1]);
}

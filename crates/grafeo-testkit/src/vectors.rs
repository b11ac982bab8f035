//! Golden test vectors for deterministic verification.
//!
//! Ed25519 signing is deterministic, so records built from fixed seeds must
//! reproduce these public keys, payloads and signatures byte for byte in any
//! implementation of the protocol.

use grafeo_core::{KeyPair, Producer, Product, ProtocolConfig, Record};

/// A golden producer vector.
#[derive(Debug, Clone)]
pub struct ProducerVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    /// Producer name.
    pub producer_name: &'static str,
    /// Expected public key (hex).
    pub expected_public_key: &'static str,
    /// Expected payload.
    pub expected_payload: &'static str,
    /// Expected signature (hex).
    pub expected_signature: &'static str,
}

/// A golden product vector. All products are made by [`PRODUCER_SEED`].
#[derive(Debug, Clone)]
pub struct ProductVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for the product's own key.
    pub seed: [u8; 32],
    /// Seeds of the input products, in input order.
    pub input_seeds: &'static [[u8; 32]],
    /// Product name.
    pub product_name: &'static str,
    /// Expected payload.
    pub expected_payload: &'static str,
    /// Expected signature by the product's own key.
    pub expected_product_signature: &'static str,
    /// Expected signature by the producer.
    pub expected_producer_signature: &'static str,
    /// Expected input signatures, in input order.
    pub expected_input_signatures: &'static [&'static str],
}

/// Seed of the producer behind every product vector.
pub const PRODUCER_SEED: [u8; 32] = [0x01; 32];

const ACME: &str = "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c";

/// Get all golden producer vectors.
pub fn producer_vectors() -> Vec<ProducerVector> {
    vec![ProducerVector {
        name: "Producer Acme",
        seed: PRODUCER_SEED,
        producer_name: "Acme",
        expected_public_key: ACME,
        expected_payload: "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c;;0,,0,,0;;Acme",
        expected_signature: "46241ad0f0d3ba16658f705a7a5283fb2b072b827c7435a4837b6121f0300b90\
                             82a46af9bf36b0dc5bdf952a5426fdd7863931f2477895254af048caf69dd404",
    }]
}

/// Get all golden product vectors.
pub fn product_vectors() -> Vec<ProductVector> {
    vec![
        ProductVector {
            name: "Product without inputs",
            seed: [0x02; 32],
            input_seeds: &[],
            product_name: "Bolt",
            expected_payload: "8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394;;0,,0,,0;;Bolt;;\
                               8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c;;",
            expected_product_signature: "bba5c27f0d9b337129d230bae94282fd9817eeb8f523090d3d3bc2fa9ec48f36\
                                         6445f857153d281d6c946590ac62d27539d9c0b150ef8dc6f21836f6e4c3fb03",
            expected_producer_signature: "19d14a21a973ff4cbb326442eb214cc3688ab92fbbd75deda5adef11a3738697\
                                          cd3f0aa367e195a2d7d479eec3716b0611b838be05b0b42010642edf63a09d01",
            expected_input_signatures: &[],
        },
        ProductVector {
            name: "Product with one input",
            seed: [0x03; 32],
            input_seeds: &[[0x02; 32]],
            product_name: "Frame",
            expected_payload: "ed4928c628d1c2c6eae90338905995612959273a5c63f93636c14614ac8737d1;;0,,0,,0;;Frame;;\
                               8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c;;\
                               8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394",
            expected_product_signature: "c58984cca49f900c9fa541dfc862db8558d0e2bd2ee3959a8bf5a3dcc763f419\
                                         77e9b5bd984bcc39b8a210c8eb02d10657d4b21865059860f4a2e5f0c83af000",
            expected_producer_signature: "bed057f273206b2938fe6df50d3c3b00b331f561df85a314e482e34ebe07c24e\
                                          84323c5916be8f5b94ab9d83f21c40287fc8bb6717ce49ca7ba8f72e166b3806",
            expected_input_signatures: &["bebd0ed0d62011d3041f6f2f57872d9587c78a1214d699bb083f15de5c45a1c0\
                                          52e09a58e49f9ca84f0fe0884a29e9566ad8ef2bde4a54160cd80f541dc0dd0e"],
        },
    ]
}

/// Build the producer described by a vector.
pub fn producer_from_vector(vector: &ProducerVector) -> Producer {
    let key_pair = KeyPair::from_seed(&vector.seed);
    let mut producer = Producer::new(
        &ProtocolConfig::default(),
        key_pair.public_key(),
        vector.producer_name,
    );
    producer
        .sign(&key_pair.private_key())
        .expect("vector producer must sign");
    producer
}

/// Build the product described by a vector.
pub fn product_from_vector(vector: &ProductVector) -> Product {
    let key_pair = KeyPair::from_seed(&vector.seed);
    let producer = KeyPair::from_seed(&PRODUCER_SEED);
    let inputs: Vec<KeyPair> = vector.input_seeds.iter().map(KeyPair::from_seed).collect();

    let mut product = Product::new(
        &ProtocolConfig::default(),
        key_pair.public_key(),
        vector.product_name,
        producer.public_key(),
        inputs.iter().map(KeyPair::public_key).collect(),
    );
    let input_private_keys: Vec<String> = inputs.iter().map(KeyPair::private_key).collect();
    product
        .sign(
            &key_pair.private_key(),
            &producer.private_key(),
            &input_private_keys,
        )
        .expect("vector product must sign");
    product
}

/// Check every vector against a freshly built record.
///
/// Returns `(vector name, matches)` pairs.
pub fn verify_all_vectors() -> Vec<(String, bool)> {
    let producers = producer_vectors().into_iter().map(|v| {
        let p = producer_from_vector(&v);
        let matches = p.public_key == v.expected_public_key
            && p.payload() == v.expected_payload
            && p.signature == v.expected_signature;
        (v.name.to_string(), matches)
    });

    let products = product_vectors().into_iter().map(|v| {
        let p = product_from_vector(&v);
        let matches = p.payload() == v.expected_payload
            && p.product_signature == v.expected_product_signature
            && p.producer_signature == v.expected_producer_signature
            && p.input_signatures == v.expected_input_signatures;
        (v.name.to_string(), matches)
    });

    producers.chain(products).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafeo_core::verify;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches) in verify_all_vectors() {
            assert!(matches, "Vector '{}' does not match its expected output", name);
        }
    }

    #[test]
    fn test_vector_records_are_valid() {
        for vector in producer_vectors() {
            assert!(producer_from_vector(&vector).is_valid(), "{}", vector.name);
        }
        for vector in product_vectors() {
            assert!(product_from_vector(&vector).is_valid(), "{}", vector.name);
        }
    }

    #[test]
    fn test_vector_signatures_verify_directly() {
        let v = &product_vectors()[1];
        let input = KeyPair::from_seed(&v.input_seeds[0]);
        assert!(verify(
            &input.public_key(),
            v.expected_payload.as_bytes(),
            v.expected_input_signatures[0],
        ));
        assert!(verify(
            ACME,
            v.expected_payload.as_bytes(),
            v.expected_producer_signature,
        ));
    }

    #[test]
    fn test_flat_projection_of_vector() {
        let product = product_from_vector(&product_vectors()[1]);
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["producer_public_key"], ACME);
        assert_eq!(json["version_major"], 0);
        assert_eq!(
            json["input_pub_keys"][0],
            "8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394"
        );
        assert_eq!(
            json["input_signatures"][0],
            product_vectors()[1].expected_input_signatures[0]
        );
    }
}

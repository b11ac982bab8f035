//! Proptest generators for property-based testing.

use proptest::prelude::*;

use grafeo_core::{KeyPair, Producer, Product, ProtocolConfig, Version};

/// Generate a random key pair.
pub fn key_pair() -> impl Strategy<Value = KeyPair> {
    any::<[u8; 32]>().prop_map(|seed| KeyPair::from_seed(&seed))
}

/// Generate a well-formed public key.
pub fn public_key() -> impl Strategy<Value = String> {
    key_pair().prop_map(|kp| kp.public_key())
}

/// Generate a version.
pub fn version() -> impl Strategy<Value = Version> {
    (0u32..4, 0u32..4, 0u32..4).prop_map(Version::from)
}

/// Generate a name that passes the name rule, including non-ASCII text.
pub fn name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9äöüßé][A-Za-z0-9äöüßé .:_-]{0,31}".prop_map(String::from)
}

/// Generate a name with a separator token embedded in it.
pub fn name_with_separator() -> impl Strategy<Value = String> {
    (name(), prop_oneof![Just(";;"), Just(",,")], name())
        .prop_map(|(head, sep, tail)| format!("{}{}{}", head, sep, tail))
}

/// Parameters for generating a producer.
#[derive(Debug, Clone)]
pub struct ProducerParams {
    pub key_pair: KeyPair,
    pub name: String,
}

impl Arbitrary for ProducerParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (key_pair(), name())
            .prop_map(|(key_pair, name)| ProducerParams { key_pair, name })
            .boxed()
    }
}

/// Generate a signed producer from parameters.
pub fn producer_from_params(params: &ProducerParams) -> Producer {
    let mut producer = Producer::new(
        &ProtocolConfig::default(),
        params.key_pair.public_key(),
        params.name.clone(),
    );
    producer
        .sign(&params.key_pair.private_key())
        .expect("generated producer must sign");
    producer
}

/// Parameters for generating a product.
#[derive(Debug, Clone)]
pub struct ProductParams {
    pub key_pair: KeyPair,
    pub producer: KeyPair,
    pub inputs: Vec<KeyPair>,
    pub name: String,
}

impl ProductParams {
    /// Private keys of the inputs, in input order.
    pub fn input_private_keys(&self) -> Vec<String> {
        self.inputs.iter().map(KeyPair::private_key).collect()
    }

    /// An unsigned product built from these parameters.
    pub fn unsigned(&self) -> Product {
        Product::new(
            &ProtocolConfig::default(),
            self.key_pair.public_key(),
            self.name.clone(),
            self.producer.public_key(),
            self.inputs.iter().map(KeyPair::public_key).collect(),
        )
    }
}

impl Arbitrary for ProductParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            key_pair(),
            key_pair(),
            prop::collection::vec(key_pair(), 0..4),
            name(),
        )
            .prop_map(|(key_pair, producer, inputs, name)| ProductParams {
                key_pair,
                producer,
                inputs,
                name,
            })
            .boxed()
    }
}

/// Generate a signed product from parameters.
pub fn product_from_params(params: &ProductParams) -> Product {
    let mut product = params.unsigned();
    product
        .sign(
            &params.key_pair.private_key(),
            &params.producer.private_key(),
            &params.input_private_keys(),
        )
        .expect("generated product must sign");
    product
}

/// Replace the hex digit at `index` with a different hex digit.
pub fn flip_hex_char(hex: &str, index: usize) -> String {
    hex.char_indices()
        .map(|(i, c)| {
            if i != index {
                c
            } else if c == '0' {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafeo_core::{check_name, product_payload, Record, SignError};

    proptest! {
        #[test]
        fn test_generated_names_pass_name_rule(name in name()) {
            prop_assert!(check_name(&name));
        }

        #[test]
        fn test_separator_names_fail_name_rule(name in name_with_separator()) {
            prop_assert!(!check_name(&name));
        }

        #[test]
        fn test_signed_producer_is_valid(params: ProducerParams) {
            let producer = producer_from_params(&params);
            prop_assert!(producer.is_valid());
            // Checking twice answers the same and changes nothing
            let before = producer.clone();
            prop_assert!(producer.is_valid());
            prop_assert_eq!(producer, before);
        }

        #[test]
        fn test_signed_product_is_valid(params: ProductParams) {
            let product = product_from_params(&params);
            prop_assert!(product.is_valid());
            prop_assert_eq!(product.input_signatures.len(), params.inputs.len());
        }

        #[test]
        fn test_payload_is_deterministic(params: ProductParams) {
            let a = product_from_params(&params);
            let b = product_from_params(&params);
            prop_assert_eq!(a.payload(), b.payload());
            prop_assert_eq!(
                a.payload(),
                product_payload(
                    &a.public_key,
                    &a.version,
                    &a.name,
                    &a.producer_public_key,
                    &a.input_public_keys,
                )
            );
        }

        #[test]
        fn test_flipped_producer_signature_invalidates(
            params: ProducerParams,
            index in 0usize..128,
        ) {
            let mut producer = producer_from_params(&params);
            producer.signature = flip_hex_char(&producer.signature, index);
            prop_assert!(!producer.is_valid());
        }

        #[test]
        fn test_flipped_product_signature_invalidates(
            params: ProductParams,
            which in 0usize..6,
            index in 0usize..128,
        ) {
            let mut product = product_from_params(&params);
            let slots = 2 + product.input_signatures.len();
            match which % slots {
                0 => product.product_signature = flip_hex_char(&product.product_signature, index),
                1 => product.producer_signature = flip_hex_char(&product.producer_signature, index),
                n => {
                    let sig = &mut product.input_signatures[n - 2];
                    *sig = flip_hex_char(sig, index);
                }
            }
            prop_assert!(!product.is_valid());
        }

        #[test]
        fn test_changed_name_invalidates(params: ProductParams, other in name()) {
            prop_assume!(other != params.name);
            let mut product = product_from_params(&params);
            product.name = other;
            prop_assert!(!product.is_valid());
        }

        #[test]
        fn test_missing_input_key_leaves_product_unsigned(params: ProductParams) {
            prop_assume!(!params.inputs.is_empty());
            let mut product = params.unsigned();
            let before = product.clone();

            let mut keys = params.input_private_keys();
            keys.pop();
            let result = product.sign(
                &params.key_pair.private_key(),
                &params.producer.private_key(),
                &keys,
            );

            prop_assert!(
                matches!(result, Err(SignError::Precondition(_))),
                "expected precondition failure, got {:?}",
                result
            );
            prop_assert_eq!(product, before);
        }
    }

    #[test]
    fn test_flip_hex_char_changes_one_char() {
        assert_eq!(flip_hex_char("abc0", 3), "abc1");
        assert_eq!(flip_hex_char("abc0", 0), "0bc0");
    }
}

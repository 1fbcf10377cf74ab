use base64::{engine::general_purpose::STANDARD, Engine as _};
use construct_analytics::{
    decode_analytics, format_analytics, AnalyticsConfig, AnalyticsEncoder, ConstructInfo,
    EncodedAnalytics, PayloadFormat, VersionGroups,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::io::Write;

fn info(fqn: &str, version: &str) -> ConstructInfo {
    ConstructInfo::new(fqn, version)
}

fn deflate64(plaintext: &str) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(plaintext.as_bytes()).unwrap();
    STANDARD.encode(encoder.finish().unwrap())
}

/// Enough distinct-but-repetitive FQNs that gzip beats plaintext.
fn many_constructs() -> Vec<ConstructInfo> {
    (0..200)
        .map(|i| {
            let version = if i % 2 == 0 { "2.100.0" } else { "2.99.1" };
            info(
                &format!("aws-cdk-lib.aws_service{i}.CfnResourceWithLongName{i}"),
                version,
            )
        })
        .collect()
}

#[test]
fn groups_constructs_by_version() {
    let infos = vec![
        info("aws-cdk-lib.Stack", "1.90.0"),
        info("aws-cdk-lib.Construct", "1.90.0"),
        info("aws-cdk-lib-experiments.NewStuff", "0.42.1"),
    ];

    assert_eq!(
        format_analytics(&infos, true),
        "v2:plaintext:1.90.0!aws-cdk-lib.{Stack,Construct},0.42.1!aws-cdk-lib-experiments.NewStuff"
    );
}

#[test]
fn groups_mixed_depths_under_shared_prefix() {
    let infos = vec![
        info("aws-cdk-lib.Stack", "1.90.0"),
        info("aws-cdk-lib.Construct", "1.90.0"),
        info("aws-cdk-lib.service.Resource", "1.90.0"),
        info("aws-cdk-lib-experiments.NewStuff", "0.42.1"),
    ];

    assert_eq!(
        format_analytics(&infos, true),
        "v2:plaintext:1.90.0!aws-cdk-lib.{Stack,Construct,service.Resource},0.42.1!aws-cdk-lib-experiments.NewStuff"
    );
}

#[test]
fn single_chain_has_no_braces() {
    let infos = vec![info("aws-cdk-lib.service.Resource", "1.90.0")];
    let encoded = format_analytics(&infos, true);

    assert_eq!(encoded, "v2:plaintext:1.90.0!aws-cdk-lib.service.Resource");
    assert!(!encoded.contains('{') && !encoded.contains('}'));
}

#[test]
fn braces_open_at_first_branch() {
    let infos = vec![info("A.B.C", "1.0.0"), info("A.B.D", "1.0.0")];
    assert_eq!(format_analytics(&infos, true), "v2:plaintext:1.0.0!A.B.{C,D}");
}

#[test]
fn repeated_constructs_are_listed_once() {
    let infos = vec![
        info("aws-cdk-lib.Stack", "1.90.0"),
        info("aws-cdk-lib.Stack", "1.90.0"),
        info("aws-cdk-lib.Stack", "1.90.0"),
    ];
    assert_eq!(
        format_analytics(&infos, true),
        "v2:plaintext:1.90.0!aws-cdk-lib.Stack"
    );
}

#[test]
fn empty_input_yields_empty_payload() {
    assert_eq!(format_analytics(&[], true), "v2:plaintext:");
    assert_eq!(format_analytics(&[], false), "v2:plaintext:");
}

#[test]
fn encoding_is_idempotent() {
    let infos = many_constructs();
    assert_eq!(format_analytics(&infos, false), format_analytics(&infos, false));
    assert_eq!(format_analytics(&infos, true), format_analytics(&infos, true));
}

#[test]
fn large_input_is_compressed() {
    let infos = many_constructs();
    let plaintext = VersionGroups::from_infos(&infos).encode();

    let encoded: EncodedAnalytics = format_analytics(&infos, false).parse().unwrap();
    assert_eq!(encoded.format, PayloadFormat::Deflate64);
    assert!(encoded.payload.len() < plaintext.len());
}

#[test]
fn chosen_payload_is_never_longer() {
    let small = vec![info("aws-cdk-lib.Stack", "1.90.0")];
    let empty = Vec::new();
    for infos in [empty, small, many_constructs()] {
        let plaintext = VersionGroups::from_infos(&infos).encode();
        let compressed = deflate64(&plaintext);
        let encoded: EncodedAnalytics = format_analytics(&infos, false).parse().unwrap();
        match encoded.format {
            PayloadFormat::Plaintext => {
                assert_eq!(encoded.payload, plaintext);
                assert!(plaintext.len() <= compressed.len());
            }
            PayloadFormat::Deflate64 => {
                // Header bytes differ from zlib's by OS id only; lengths match.
                assert_eq!(encoded.payload.len(), compressed.len());
                assert!(compressed.len() < plaintext.len());
            }
        }
    }
}

#[test]
fn force_plaintext_overrides_size() {
    let infos = many_constructs();
    let encoded = format_analytics(&infos, true);
    assert!(encoded.starts_with("v2:plaintext:2.100.0!aws-cdk-lib.aws_{"));
}

#[test]
fn compressed_output_decodes_to_same_constructs() {
    let infos = many_constructs();
    let encoded = format_analytics(&infos, false);
    assert!(encoded.starts_with("v2:deflate64:"));

    let decoded: BTreeSet<_> = decode_analytics(&encoded).unwrap().into_iter().collect();
    let expected: BTreeSet<_> = infos.into_iter().collect();
    assert_eq!(decoded, expected);
}

#[test]
fn decode_respects_configured_limit() {
    let infos = many_constructs();
    let encoded = format_analytics(&infos, false);

    let encoder = AnalyticsEncoder::new(AnalyticsConfig {
        max_decoded_bytes: 64,
        ..AnalyticsConfig::default()
    })
    .unwrap();
    let err = encoder.decode(&encoded).unwrap_err();
    assert!(err.to_string().contains("too large"));
}

#[test]
fn compression_level_is_configurable() {
    let infos = many_constructs();
    let stored = AnalyticsEncoder::new(AnalyticsConfig {
        compression_level: 0,
        ..AnalyticsConfig::default()
    })
    .unwrap();

    // Level 0 stores the deflate blocks uncompressed, so plaintext is smaller.
    assert_eq!(stored.encode(&infos).format, PayloadFormat::Plaintext);

    let best = AnalyticsEncoder::new(AnalyticsConfig {
        compression_level: 9,
        ..AnalyticsConfig::default()
    })
    .unwrap();
    let encoded = best.encode(&infos);
    assert_eq!(encoded.format, PayloadFormat::Deflate64);
    let decoded: BTreeSet<_> = best.decode(&encoded.to_string()).unwrap().into_iter().collect();
    assert_eq!(decoded.len(), infos.len());
}

#[test]
fn very_long_fqn_encodes_and_decodes() {
    let fqn = "a.".repeat(200_000);
    let infos = vec![info(&fqn, "1.0")];

    assert_eq!(format_analytics(&infos, true), format!("v2:plaintext:1.0!{fqn}"));

    let encoded = format_analytics(&infos, false);
    assert!(encoded.starts_with("v2:deflate64:"));
    assert_eq!(decode_analytics(&encoded).unwrap(), infos);
}

#[test]
fn separator_only_fqn_encodes() {
    let fqn = ".".repeat(20_000);
    let infos = vec![info(&fqn, "1.0")];
    assert_eq!(format_analytics(&infos, true), format!("v2:plaintext:1.0!{fqn}"));
}

#[test]
fn deeply_branching_trie_roundtrips() {
    let infos: Vec<_> = (0..1_000)
        .map(|i| info(&format!("{}Leaf", "lib.".repeat(i)), "3.0.0"))
        .collect();
    let encoded = format_analytics(&infos, true);
    assert_eq!(encoded.matches('{').count(), 998);

    let decoded: BTreeSet<_> = decode_analytics(&encoded).unwrap().into_iter().collect();
    let expected: BTreeSet<_> = infos.into_iter().collect();
    assert_eq!(decoded, expected);
}

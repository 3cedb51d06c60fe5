#![cfg(feature = "serde")]
use pretty_assertions::assert_eq;
use socow_vec::SocowVec;

#[test]
fn postcard_round_trip() {
	let inline: SocowVec<u32, 4> = SocowVec::from_slice(&[1, 2, 3]);
	let bytes = postcard::to_allocvec(&inline).unwrap();
	assert_eq!(bytes, postcard::to_allocvec(&vec![1u32, 2, 3]).unwrap());

	let decoded: SocowVec<u32, 4> = postcard::from_bytes(&bytes).unwrap();
	assert_eq!(decoded, inline);
	assert!(!decoded.is_spilled());

	let spilled: SocowVec<String, 2> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
	let bytes = postcard::to_allocvec(&spilled).unwrap();
	let decoded: SocowVec<String, 2> = postcard::from_bytes(&bytes).unwrap();
	assert_eq!(decoded, spilled);
	assert!(decoded.is_spilled());
	assert_eq!(decoded.capacity(), 3);
}

#[test]
fn truncated_input_is_an_error() {
	let bytes = postcard::to_allocvec(&vec![1u32, 2, 3, 4, 5]).unwrap();
	let result: Result<SocowVec<u32, 2>, _> = postcard::from_bytes(&bytes[..3]);
	assert!(result.is_err());
}

//! Salted file name hash stored in archive indexes.

/// Per-archive salt: four character positions mixed into the hash.
pub type Salt = [u8; 4];

/// Hashes a file name the way archive indexes store it.
///
/// The name is upper-cased. A 16-bit running sum is multiplied by the 16-bit xor of
/// all characters, then added to a 32-bit value built from the characters at the
/// four salt positions (zero for positions past the end of the name).
pub fn dgds_hash(name: &str, salt: &Salt) -> u32 {
	let bytes = name.as_bytes();

	let mut sum: u16 = 0;
	let mut xor: u16 = 0;
	for &b in bytes {
		let c = u16::from(b.to_ascii_uppercase());
		sum = sum.wrapping_add(c);
		xor ^= c;
	}
	let product = sum.wrapping_mul(xor);

	let mut picked: u32 = 0;
	for &idx in salt {
		picked <<= 8;
		if let Some(&b) = bytes.get(usize::from(idx)) {
			picked |= u32::from(b.to_ascii_uppercase());
		}
	}

	picked.wrapping_add(u32::from(product))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_is_case_insensitive() {
		let salt = [0, 3, 5, 9];
		assert_eq!(dgds_hash("dragon.fnt", &salt), dgds_hash("DRAGON.FNT", &salt));
	}

	#[test]
	fn test_hash_value() {
		// "AB": sum 131, xor 3, product 393; positions 0 and 1 pick 'A' and 'B'
		let hash = dgds_hash("AB", &[0, 1, 7, 7]);
		assert_eq!(hash, 0x4142_0000 + 393);
	}

	#[test]
	fn test_product_wraps_to_sixteen_bits() {
		// sum 1199, xor 63: 75537 wraps to 10001
		let hash = dgds_hash("~~~~~~~~~A", &[20, 20, 20, 20]);
		assert_eq!(hash, 10001);

		// An even count of equal characters xors to zero, leaving only the salt picks
		let long = "Z".repeat(400);
		assert_eq!(dgds_hash(&long, &[200, 200, 200, 200]), 0x5A5A_5A5A);
	}

	#[test]
	fn test_salt_changes_hash() {
		assert_ne!(dgds_hash("INTRO.TTM", &[0, 1, 2, 3]), dgds_hash("INTRO.TTM", &[4, 5, 6, 7]));
	}
}

//! Builds the call data of the target call from a human-readable signature.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt},
    json_abi::Function,
    primitives::Bytes,
};

use crate::{error::ConfigError, Result};

/// ABI-encodes a call to `sig` with string arguments coerced to the declared
/// parameter types.
///
/// ## Example
/// ```
/// use blaster_core::calldata::encode_calldata;
///
/// let calldata = encode_calldata("set(uint256 x)", &["0x12345678"]).unwrap();
/// assert_eq!(
///     calldata.to_string(),
///     "0x60fe47b10000000000000000000000000000000000000000000000000000000012345678"
/// );
/// ```
pub fn encode_calldata(sig: &str, args: &[impl AsRef<str>]) -> Result<Bytes> {
    let encoding_err = |reason: String| ConfigError::CalldataEncoding {
        sig: sig.to_owned(),
        reason,
    };
    let func = Function::parse(sig).map_err(|e| encoding_err(e.to_string()))?;
    let types = func
        .inputs
        .iter()
        .map(|param| DynSolType::parse(&param.selector_type()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| encoding_err(e.to_string()))?;

    // tuple members may be passed one by one or as a single "(a,b)" literal
    let leaves = types.iter().map(leaf_count).sum::<usize>();
    let values = if args.len() == leaves {
        let mut args = args.iter().map(|arg| arg.as_ref());
        types
            .iter()
            .map(|ty| coerce_leaves(ty, &mut args))
            .collect::<std::result::Result<Vec<_>, _>>()
    } else if args.len() == types.len() {
        types
            .iter()
            .zip(args)
            .map(|(ty, arg)| ty.coerce_str(arg.as_ref()).map_err(|e| e.to_string()))
            .collect::<std::result::Result<Vec<_>, _>>()
    } else {
        Err(format!(
            "expected {} args ({} params), got {}",
            leaves,
            types.len(),
            args.len()
        ))
    }
    .map_err(encoding_err)?;

    let input = func
        .abi_encode_input(&values)
        .map_err(|e| encoding_err(e.to_string()))?;
    Ok(input.into())
}

/// Number of scalar arguments needed to fill `ty` when tuples are flattened.
fn leaf_count(ty: &DynSolType) -> usize {
    match ty {
        DynSolType::Tuple(members) => members.iter().map(leaf_count).sum(),
        _ => 1,
    }
}

/// Builds a value of type `ty`, consuming one argument per tuple leaf.
fn coerce_leaves<'a>(
    ty: &DynSolType,
    args: &mut impl Iterator<Item = &'a str>,
) -> std::result::Result<DynSolValue, String> {
    match ty {
        DynSolType::Tuple(members) => members
            .iter()
            .map(|member| coerce_leaves(member, &mut *args))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(DynSolValue::Tuple),
        _ => {
            let arg = args.next().ok_or_else(|| format!("missing value for {}", ty.sol_type_name()))?;
            ty.coerce_str(arg).map_err(|e| e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use alloy::primitives::keccak256;

    #[test]
    fn encodes_bare_selector() {
        let calldata = encode_calldata("claim()", &[] as &[&str]).unwrap();
        assert_eq!(calldata.as_ref(), &keccak256("claim()")[..4]);
    }

    #[test]
    fn encodes_args() {
        let calldata = encode_calldata("set(uint256 x)", &["0x12345678"]).unwrap();
        assert_eq!(
            calldata.to_string(),
            "0x60fe47b10000000000000000000000000000000000000000000000000000000012345678"
        );
    }

    #[test]
    fn rejects_wrong_arg_count() {
        let res = encode_calldata("set(uint256 x)", &[] as &[&str]);
        assert!(matches!(
            res,
            Err(Error::Config(ConfigError::CalldataEncoding { .. }))
        ));
    }

    #[test]
    fn tuple_params_keep_their_selector() {
        let word = |n: u8| {
            let mut word = [0u8; 32];
            word[31] = n;
            word
        };
        let mut expected = keccak256("set((uint256,uint256))")[..4].to_vec();
        expected.extend_from_slice(&word(1));
        expected.extend_from_slice(&word(2));

        let flat = encode_calldata("set((uint256,uint256) p)", &["1", "2"]).unwrap();
        assert_eq!(flat.as_ref(), expected.as_slice());

        let literal = encode_calldata("set((uint256,uint256) p)", &["(1,2)"]).unwrap();
        assert_eq!(literal, flat);
    }

    #[test]
    fn nested_tuples_consume_args_in_order() {
        let args = ["7", "0x0000000000000000000000000000000000000001", "true", "9"];
        let calldata = encode_calldata("set((uint256,(address,bool)) p,uint8 x)", &args).unwrap();
        assert_eq!(
            &calldata[..4],
            &keccak256("set((uint256,(address,bool)),uint8)")[..4]
        );
        // four static words follow the selector
        assert_eq!(calldata.len(), 4 + 4 * 32);
        assert_eq!(calldata[4 + 31], 7);
        assert_eq!(calldata[4 + 3 * 32 + 31], 9);
    }
}

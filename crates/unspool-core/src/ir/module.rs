use serde::{Deserialize, Serialize};

use crate::entity::PrimaryMap;

use super::func::{FuncId, Function};

/// A module — the top-level unit the back-end runs over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: PrimaryMap<FuncId, Function>,
}

impl Module {
    pub fn new(name: String) -> Self {
        Self {
            name,
            functions: PrimaryMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CmpKind, FunctionBuilder, FunctionSig, Type};

    #[test]
    fn modules_round_trip_through_json() {
        let sig = FunctionSig {
            params: vec![Type::Int(64)],
            return_ty: Type::Bool,
        };
        let mut fb = FunctionBuilder::new("is_negative", sig);
        let x = fb.param(0);
        fb.name_value(x, "x");
        let zero = fb.const_int(0);
        let result = fb.cmp(CmpKind::Lt, x, zero);
        fb.ret(Some(result));

        let mut module = Module::new("roundtrip".into());
        let id = module.functions.push(fb.build());

        let json = serde_json::to_string(&module).unwrap();
        let back: Module = serde_json::from_str(&json).unwrap();

        assert_eq!(back.name, module.name);
        assert_eq!(back.functions.len(), 1);
        let func = &back.functions[id];
        assert_eq!(func.name, "is_negative");
        assert_eq!(func.blocks.len(), 1);
        assert_eq!(func.insts.len(), 3);
        assert_eq!(func.value_names.get(&x).map(String::as_str), Some("x"));
    }
}

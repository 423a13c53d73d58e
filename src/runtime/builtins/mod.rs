use crate::runtime::builtin_function::BuiltinFunction;

mod collection_ops;
mod conversion_ops;
pub(crate) mod helpers;
mod type_check;

use collection_ops::{builtin_append, builtin_copy, builtin_delete, builtin_len, builtin_range};
use conversion_ops::{
    builtin_bool, builtin_bytes, builtin_char, builtin_float, builtin_int, builtin_string,
    builtin_type_name,
};
use type_check::{
    builtin_is_array, builtin_is_bool, builtin_is_bytes, builtin_is_callable, builtin_is_char,
    builtin_is_error, builtin_is_float, builtin_is_function, builtin_is_int, builtin_is_map,
    builtin_is_string, builtin_is_undefined,
};

/// All built-in functions in order (index matters for OpGetBuiltin)
pub static BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction {
        name: "len",
        func: builtin_len,
    },
    BuiltinFunction {
        name: "copy",
        func: builtin_copy,
    },
    BuiltinFunction {
        name: "append",
        func: builtin_append,
    },
    BuiltinFunction {
        name: "delete",
        func: builtin_delete,
    },
    BuiltinFunction {
        name: "type_name",
        func: builtin_type_name,
    },
    BuiltinFunction {
        name: "string",
        func: builtin_string,
    },
    BuiltinFunction {
        name: "int",
        func: builtin_int,
    },
    BuiltinFunction {
        name: "float",
        func: builtin_float,
    },
    BuiltinFunction {
        name: "bool",
        func: builtin_bool,
    },
    BuiltinFunction {
        name: "char",
        func: builtin_char,
    },
    BuiltinFunction {
        name: "bytes",
        func: builtin_bytes,
    },
    BuiltinFunction {
        name: "range",
        func: builtin_range,
    },
    BuiltinFunction {
        name: "is_int",
        func: builtin_is_int,
    },
    BuiltinFunction {
        name: "is_float",
        func: builtin_is_float,
    },
    BuiltinFunction {
        name: "is_string",
        func: builtin_is_string,
    },
    BuiltinFunction {
        name: "is_bool",
        func: builtin_is_bool,
    },
    BuiltinFunction {
        name: "is_char",
        func: builtin_is_char,
    },
    BuiltinFunction {
        name: "is_bytes",
        func: builtin_is_bytes,
    },
    BuiltinFunction {
        name: "is_array",
        func: builtin_is_array,
    },
    BuiltinFunction {
        name: "is_map",
        func: builtin_is_map,
    },
    BuiltinFunction {
        name: "is_error",
        func: builtin_is_error,
    },
    BuiltinFunction {
        name: "is_undefined",
        func: builtin_is_undefined,
    },
    BuiltinFunction {
        name: "is_function",
        func: builtin_is_function,
    },
    BuiltinFunction {
        name: "is_callable",
        func: builtin_is_callable,
    },
];

#[cfg(test)]
mod collection_ops_test;

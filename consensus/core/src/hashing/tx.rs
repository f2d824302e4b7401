use super::HasherExtensions;
use crate::tx::{Transaction, TransactionInput, TransactionOutput};
use crate::Hash;
use dag_hashes::{HasherBase, TransactionID};

/// Returns the transaction ID, which commits to every field including the payload
pub fn id(tx: &Transaction) -> Hash {
    let mut hasher = TransactionID::new();
    hasher.write_u16(tx.version).write_len(tx.inputs.len());
    for input in &tx.inputs {
        write_input(&mut hasher, input);
    }
    hasher.write_len(tx.outputs.len());
    for output in &tx.outputs {
        write_output(&mut hasher, output);
    }
    hasher.write_u64(tx.lock_time).update(tx.subnetwork_id).write_u64(tx.gas).write_var_bytes(&tx.payload);
    hasher.finalize()
}

fn write_input(hasher: &mut TransactionID, input: &TransactionInput) {
    hasher
        .update(input.previous_outpoint.transaction_id)
        .write_u32(input.previous_outpoint.index)
        .write_var_bytes(&input.signature_script)
        .write_u64(input.sequence)
        .write_u8(input.sig_op_count);
}

fn write_output(hasher: &mut TransactionID, output: &TransactionOutput) {
    hasher
        .write_u64(output.value)
        .write_u16(output.script_public_key.version())
        .write_var_bytes(output.script_public_key.script());
}

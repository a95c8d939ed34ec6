/*! Block implementation

Blocks are the main buildingblocks. They each do one thing, and you connect
them together with streams to process the data.

*/
use crate::Result;
use crate::signature::Signature;
use crate::stream::StreamWait;

/** Return type for all blocks.

This will let the scheduler know if more data could come out of this block,
or if it should just never bother calling it again.
*/
pub enum BlockRet<'a> {
    /// Block did something, and may have more to do right away.
    Again,

    /// Produced nothing, because there was no room to write.
    Noop,

    /// Nothing more can be done until the stream has at least this many
    /// samples, or gets closed.
    WaitForStream(&'a dyn StreamWait, usize),

    /// Block indicates that it will never produce more output.
    ///
    /// Examples:
    /// * vector source, without repeating, reached the end.
    /// * Head block reached its max.
    EOF,
}

impl std::fmt::Debug for BlockRet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BlockRet::Again => write!(f, "Again"),
            BlockRet::Noop => write!(f, "Noop"),
            BlockRet::WaitForStream(_, need) => write!(f, "WaitForStream(_, {need})"),
            BlockRet::EOF => write!(f, "EOF"),
        }
    }
}

/**
Block trait, that must be implemented for all blocks.
*/
pub trait Block {
    /** Name of block

    Not name of *instance* of block. But it may include the
    type. E.g. `VectorSource<u8>`.
    */
    fn block_name(&self) -> &str;

    /// Input and output stream signature, fixed at construction.
    fn signature(&self) -> Signature;

    /** Block work function

    A pure source block will only write to its output streams, and a pure
    sink block will only read.

    Consuming data from an input stream involves first reading it, and then
    consuming it. Data that isn't consumed will be read again on the next
    call.
    */
    fn work(&mut self) -> Result<BlockRet<'_>>;

    /// Return true if the block will never produce anything again.
    fn eof(&mut self) -> bool {
        false
    }
}

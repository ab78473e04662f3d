mod bounds;
mod cse;
mod eval;
mod lossless_cast;
mod matching;
mod simplify;
mod vars;
